use std::borrow::Cow;

/// Best-effort repair of text that was decoded with the wrong single-byte
/// encoding: reinterpret every scalar value as a Latin-1 byte and re-decode
/// the result as UTF-8, so a mangled `"Îµ"` becomes `"ε"` again.
///
/// Returns the input unchanged when the text contains anything above U+00FF
/// or the reassembled bytes are not valid UTF-8. Never fails; callers that
/// load definition or input text may run their sources through this before
/// handing them to the loader.
pub fn repair(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(byte) => bytes.push(byte),
            Err(_) => return Cow::Borrowed(text),
        }
    }
    match String::from_utf8(bytes) {
        Ok(fixed) => Cow::Owned(fixed),
        Err(_) => Cow::Borrowed(text),
    }
}
