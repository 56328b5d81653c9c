/// Convert a UTF-16 column offset (from LSP `Position.character`) to a char
/// offset within the given line, which is what `ropey` indexes by. Offsets
/// past the end clamp to the line length.
pub fn utf16_offset_to_char_offset(line: &str, utf16_offset: usize) -> usize {
    let mut utf16_count = 0;
    for (char_count, ch) in line.chars().enumerate() {
        if utf16_count >= utf16_offset {
            return char_count;
        }
        utf16_count += ch.len_utf16();
    }
    line.chars().count()
}
