pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub rows: [u8; GLYPH_HEIGHT as usize],
}

impl Glyph {
    const fn new(rows: [u8; GLYPH_HEIGHT as usize]) -> Self {
        Self { rows }
    }

    pub(crate) fn is_set(&self, col: i32, row: i32) -> bool {
        if !(0..GLYPH_WIDTH).contains(&col) || !(0..GLYPH_HEIGHT).contains(&row) {
            return false;
        }
        self.rows[row as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
    }
}

pub(crate) const BLANK: Glyph = Glyph::new([0; 5]);

/// Horizontal distance between glyph origins at `scale`.
pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale.max(1)
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * glyph_advance(scale) - scale.max(1)
}

/// Lowercase letters render as uppercase; anything unmapped renders blank.
pub(crate) fn glyph_for(ch: char) -> Glyph {
    match ch.to_ascii_uppercase() {
        '0' => Glyph::new([0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => Glyph::new([0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => Glyph::new([0b111, 0b001, 0b111, 0b100, 0b111]),
        '3' => Glyph::new([0b111, 0b001, 0b111, 0b001, 0b111]),
        '4' => Glyph::new([0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => Glyph::new([0b111, 0b100, 0b111, 0b001, 0b111]),
        '6' => Glyph::new([0b111, 0b100, 0b111, 0b101, 0b111]),
        '7' => Glyph::new([0b111, 0b001, 0b010, 0b010, 0b010]),
        '8' => Glyph::new([0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => Glyph::new([0b111, 0b101, 0b111, 0b001, 0b111]),
        'A' => Glyph::new([0b010, 0b101, 0b111, 0b101, 0b101]),
        'B' => Glyph::new([0b110, 0b101, 0b110, 0b101, 0b110]),
        'C' => Glyph::new([0b111, 0b100, 0b100, 0b100, 0b111]),
        'D' => Glyph::new([0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => Glyph::new([0b111, 0b100, 0b110, 0b100, 0b111]),
        'F' => Glyph::new([0b111, 0b100, 0b110, 0b100, 0b100]),
        'G' => Glyph::new([0b111, 0b100, 0b101, 0b101, 0b111]),
        'H' => Glyph::new([0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => Glyph::new([0b111, 0b010, 0b010, 0b010, 0b111]),
        'J' => Glyph::new([0b111, 0b001, 0b001, 0b101, 0b111]),
        'K' => Glyph::new([0b101, 0b101, 0b110, 0b101, 0b101]),
        'L' => Glyph::new([0b100, 0b100, 0b100, 0b100, 0b111]),
        'M' => Glyph::new([0b101, 0b111, 0b111, 0b101, 0b101]),
        'N' => Glyph::new([0b101, 0b111, 0b111, 0b111, 0b101]),
        'O' => Glyph::new([0b111, 0b101, 0b101, 0b101, 0b111]),
        'P' => Glyph::new([0b110, 0b101, 0b110, 0b100, 0b100]),
        'Q' => Glyph::new([0b111, 0b101, 0b101, 0b111, 0b001]),
        'R' => Glyph::new([0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => Glyph::new([0b111, 0b100, 0b111, 0b001, 0b111]),
        'T' => Glyph::new([0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => Glyph::new([0b101, 0b101, 0b101, 0b101, 0b111]),
        'V' => Glyph::new([0b101, 0b101, 0b101, 0b101, 0b010]),
        'W' => Glyph::new([0b101, 0b101, 0b111, 0b111, 0b101]),
        'X' => Glyph::new([0b101, 0b101, 0b010, 0b101, 0b101]),
        'Y' => Glyph::new([0b101, 0b101, 0b010, 0b010, 0b010]),
        'Z' => Glyph::new([0b111, 0b001, 0b010, 0b100, 0b111]),
        '/' => Glyph::new([0b001, 0b001, 0b010, 0b100, 0b100]),
        ':' => Glyph::new([0b000, 0b010, 0b000, 0b010, 0b000]),
        '.' => Glyph::new([0b000, 0b000, 0b000, 0b000, 0b010]),
        '-' => Glyph::new([0b000, 0b000, 0b111, 0b000, 0b000]),
        '%' => Glyph::new([0b101, 0b001, 0b010, 0b100, 0b101]),
        _ => BLANK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_maps_to_uppercase_glyph() {
        assert_eq!(glyph_for('a'), glyph_for('A'));
        assert_ne!(glyph_for('A'), BLANK);
    }

    #[test]
    fn unknown_characters_render_blank() {
        assert_eq!(glyph_for('~'), BLANK);
        assert_eq!(glyph_for(' '), BLANK);
    }

    #[test]
    fn text_width_excludes_trailing_gap() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 2), 6);
        assert_eq!(text_width("30/30", 1), 19);
    }

    #[test]
    fn glyph_bits_read_left_to_right() {
        let one = glyph_for('1');
        assert!(!one.is_set(0, 0));
        assert!(one.is_set(1, 0));
        assert!(one.is_set(0, 1));
        assert!(!one.is_set(3, 0));
    }
}
