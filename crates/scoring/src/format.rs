/// `H:MM:SS`, or `H:MM` when `show_seconds` is false. Hours are not padded.
pub fn format_seconds(seconds: i64, show_seconds: bool) -> String {
    let hours = seconds.div_euclid(3600);
    let minutes = seconds.div_euclid(60).rem_euclid(60);
    if show_seconds {
        format!("{}:{:02}:{:02}", hours, minutes, seconds.rem_euclid(60))
    } else {
        format!("{}:{:02}", hours, minutes)
    }
}

/// Spreadsheet-style problem label: 0 -> A, 25 -> Z, 26 -> AA.
pub fn alphabetic_id(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
