//! URL slugs derived from titles and names

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

/// Highest numeric suffix probed before slug resolution gives up
pub const MAX_SLUG_SUFFIX: u32 = 1000;

fn separator_regex() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("Failed to compile slug separator regex")
    })
}

fn fold(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ß' => "ss",
        'ś' | 'š' => "s",
        'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Lowercase, ASCII-fold and hyphenate `input`
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single `-`, and leading or trailing hyphens are dropped. The result may be
/// empty when `input` has no usable characters.
pub fn slugify(input: &str) -> String {
    let mut ascii = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match fold(c) {
            Some(folded) => ascii.push_str(folded),
            None => ascii.push(c),
        }
    }

    separator_regex()
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}

/// Slugified `title`, or `prefix` plus a short random fragment when the title
/// has no usable characters (e.g. a title written entirely in CJK script)
pub fn from_title(title: &str, prefix: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}-{}", prefix, &id[..8])
    } else {
        slug
    }
}

/// The `n`th candidate for `base`: `base` itself, then `base-1`, `base-2`, ...
pub fn with_suffix(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}
