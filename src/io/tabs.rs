//! Tab-to-space expansion of emitted text.

/// Replaces every tab with spaces up to the next multiple of `width`.
///
/// Columns restart at each newline. A `width` of zero leaves the text alone.
pub fn expand_tabs(text: &str, width: usize) -> String {
    if width == 0 || !text.contains('\t') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = width - column % width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}
