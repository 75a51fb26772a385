// ==========================================
// 化工设备报表系统 - 标准字体字宽表
// ==========================================
// Helvetica / Helvetica-Bold（PDF 标准 14 字体）AFM 字宽
// 单位: 1/1000 em；覆盖 ASCII 32..=126，其余字符按 556 估算
// ==========================================

/// 字体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// PDF 资源名
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// 文本在给定字号下的宽度（pt）
pub fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// 截断文本使其不超过 max_width，超出时以 "..." 结尾
pub fn fit_text(text: &str, max_width: f32, size: f32, font: Font) -> String {
    if text_width(text, size, font) <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let avail = max_width - text_width(ELLIPSIS, size, font);
    let mut used = 0.0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = glyph_width(c, font) as f32 * size / 1000.0;
        if used + w > avail {
            break;
        }
        used += w;
        kept.push(c);
    }
    kept.push_str(ELLIPSIS);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Pump": P=667 u=556 m=833 p=556
        assert!((text_width("Pump", 10.0, Font::Regular) - 26.12).abs() < 1e-3);
        assert!(text_width("Pump", 10.0, Font::Bold) > text_width("Pump", 10.0, Font::Regular));
        assert_eq!(text_width("", 10.0, Font::Regular), 0.0);
    }

    #[test]
    fn test_non_ascii_fallback() {
        assert!((text_width("é", 1000.0, Font::Regular) - 556.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("Pump", 100.0, 8.0, Font::Regular), "Pump");

        let long = "Centrifugal Pump With Very Long Descriptive Name";
        let fitted = fit_text(long, 60.0, 8.0, Font::Regular);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, 8.0, Font::Regular) <= 60.0);
    }
}
