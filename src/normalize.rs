//! Answer canonicalization.
//!
//! Typed answers and card names are compared by canonical form: kana folded to
//! full-width katakana, whitespace removed, letters lowercased. Everything is
//! code-point arithmetic; no locale collation is involved.

/// Half-width katakana block (U+FF61..=U+FF9F) mapped to full-width forms.
/// Index = code point - 0xFF61.
const HALF_WIDTH_KANA: [char; 63] = [
    '。', '「', '」', '、', '・', 'ヲ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ャ', 'ュ', 'ョ', 'ッ', 'ー',
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ', 'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', 'マ', 'ミ',
    'ム', 'メ', 'モ', 'ヤ', 'ユ', 'ヨ', 'ラ', 'リ', 'ル', 'レ', 'ロ', 'ワ', 'ン', '゛', '゜',
];

const HALF_WIDTH_FIRST: u32 = 0xFF61;
const HALF_WIDTH_LAST: u32 = 0xFF9F;
const HALF_VOICED_MARK: char = '\u{FF9E}';
const HALF_SEMI_VOICED_MARK: char = '\u{FF9F}';

const HIRAGANA_FIRST: u32 = 0x3041;
const HIRAGANA_LAST: u32 = 0x3096;
const HIRAGANA_TO_KATAKANA: u32 = 0x60;

/// Canonical form used for answer comparison.
///
/// Steps, in order: half-width katakana to full-width (voiced marks merge into
/// the preceding kana), hiragana to katakana, whitespace removal, lowercase.
/// Total over every input, and idempotent.
pub fn normalize(text: &str) -> String {
    let folded = fold_half_width(text);
    folded
        .chars()
        .map(fold_hiragana)
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when both strings share a canonical form.
pub fn answers_match(answer: &str, expected: &str) -> bool {
    normalize(answer) == normalize(expected)
}

fn fold_half_width(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if !(HALF_WIDTH_FIRST..=HALF_WIDTH_LAST).contains(&code) {
            out.push(c);
            continue;
        }
        if c == HALF_VOICED_MARK || c == HALF_SEMI_VOICED_MARK {
            let merged = out.chars().next_back().and_then(|prev| {
                if c == HALF_VOICED_MARK { voiced(prev) } else { semi_voiced(prev) }
            });
            if let Some(m) = merged {
                out.pop();
                out.push(m);
                continue;
            }
        }
        out.push(HALF_WIDTH_KANA[(code - HALF_WIDTH_FIRST) as usize]);
    }
    out
}

fn fold_hiragana(c: char) -> char {
    let code = c as u32;
    if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&code) {
        char::from_u32(code + HIRAGANA_TO_KATAKANA).unwrap_or(c)
    } else {
        c
    }
}

/// Dakuten composition for full-width katakana.
fn voiced(base: char) -> Option<char> {
    match base {
        'ウ' => Some('ヴ'),
        'ワ' => Some('ヷ'),
        'ヲ' => Some('ヺ'),
        // カ..ト and ハ..ホ: the voiced form is the next code point.
        'カ' | 'キ' | 'ク' | 'ケ' | 'コ' | 'サ' | 'シ' | 'ス' | 'セ' | 'ソ' | 'タ' | 'チ' | 'ツ'
        | 'テ' | 'ト' | 'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(base as u32 + 1),
        _ => None,
    }
}

/// Handakuten composition (ハ行 only).
fn semi_voiced(base: char) -> Option<char> {
    match base {
        'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(base as u32 + 2),
        _ => None,
    }
}
