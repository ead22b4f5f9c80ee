//! Heuristic page-label extraction from document titles and paths.
//!
//! Real-world EPUBs embed page numbers in wildly inconsistent title
//! conventions, so extraction runs an ordered fallback: the CJK page
//! convention first, then the Latin "Page N" form, then any bare digit
//! run. The last step trades false positives for coverage.

/// First `<title>` text of an HTML document, trimmed.
///
/// Tolerant tag scan (case-insensitive, attributes allowed) rather than a
/// full HTML parse; content documents are frequently not well-formed XML.
pub fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let after_open = open + html[open..].find('>')? + 1;
    let close = after_open + lower[after_open..].find("</title")?;

    let title = html.get(after_open..close)?.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Extract a page number from a document title.
///
/// Tries, in order: `第N页` / `N页` (traditional `頁` accepted),
/// `Page N` (case-insensitive), then the first bare digit run. `None`
/// when nothing matches or the captured digits overflow.
pub fn extract_page_number(title: &str) -> Option<u32> {
    cjk_page_number(title)
        .or_else(|| latin_page_number(title))
        .or_else(|| first_digit_run(title))
}

/// Last-resort digit-run search against a resource path, for documents
/// with no usable title. Only the file-name component is searched, so
/// numbered directories ("vol2/cover.xhtml") don't leak in.
pub fn extract_number_from_path(path: &str) -> Option<u32> {
    first_digit_run(path.rsplit('/').next().unwrap_or(path))
}

/// `第N页`, `第N頁`, `N页`, or `N頁`.
fn cjk_page_number(s: &str) -> Option<u32> {
    let chars: Vec<char> = s.chars().collect();

    if let Some(pos) = chars.iter().position(|&c| c == '第') {
        let digits: String = chars[pos + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }
    }

    // Digits immediately followed by the page marker
    for (i, &c) in chars.iter().enumerate() {
        if (c == '页' || c == '頁') && i > 0 {
            let digits: String = chars[..i]
                .iter()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            if !digits.is_empty() {
                return digits.parse().ok();
            }
        }
    }

    None
}

/// `Page N`, any case, optional whitespace between word and digits.
fn latin_page_number(s: &str) -> Option<u32> {
    let lower = s.to_lowercase();
    let pos = lower.find("page")?;
    // Digits are ASCII, so scanning the lowercased copy is equivalent
    let rest = lower[pos + 4..].trim_start();

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// First contiguous run of ASCII digits anywhere in the string.
fn first_digit_run(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
