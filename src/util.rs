/// Formats whole seconds as zero-padded mm:ss for the countdown header.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Option index to its display letter (0 -> A, 3 -> D).
pub fn option_letter(index: usize) -> char {
    (b'A' + (index as u8 % 26)) as char
}
