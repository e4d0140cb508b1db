//! Page layout for the rendered document: word wrap and pagination.
//!
//! Pure functions, no pdfium, so the layout is testable without a library.
//! Width is measured in characters against an average glyph width, which
//! is what a monospaced-by-approximation text dump needs; the font itself is
//! embedded by the renderer.

/// A4 in PDF points.
pub const PAGE_WIDTH_PT: f32 = 595.0;
pub const PAGE_HEIGHT_PT: f32 = 842.0;

/// Geometry of one rendered page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub line_height: f32,
    /// Characters that fit on one line.
    pub chars_per_line: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        // 10 mm margins, 12 pt text on 10 mm lines.
        let margin = 28.35;
        let font_size = 12.0;
        let width = PAGE_WIDTH_PT;
        Self {
            width,
            height: PAGE_HEIGHT_PT,
            margin,
            font_size,
            line_height: 28.35,
            chars_per_line: ((width - 2.0 * margin) / (font_size * 0.5)) as usize,
        }
    }
}

impl PageLayout {
    /// Lines that fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        (((self.height - 2.0 * self.margin) / self.line_height) as usize).max(1)
    }

    /// Baseline of line `n` (0-based) on a page, measured from the bottom.
    pub fn baseline(&self, n: usize) -> f32 {
        self.height - self.margin - self.font_size - n as f32 * self.line_height
    }
}

/// Wrap `text` to at most `width` characters per line.
///
/// Existing line breaks are kept; words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        lines.push(current);
    }

    lines
}

/// Split wrapped lines into pages. Always at least one (possibly empty) page.
pub fn paginate(lines: Vec<String>, lines_per_page: usize) -> Vec<Vec<String>> {
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(lines_per_page.max(1))
        .map(<[String]>::to_vec)
        .collect()
}
