use std::fmt;
use std::time::Duration;

use rand::Rng;
use rand::seq::IndexedRandom;

/// Letter pool, vowels weighted three to one.
const LETTERS: &[u8] = b"aaabcdeeefghiiijklmnooopqrstuuuvwxyz";

/// Alphabet of the random SKU suffix.
const SKU_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const SKU_SUFFIX_LEN: usize = 8;

/// Space separated random words.
///
/// Draws `min..=max` words of `2..=max_len` letters; the first word and
/// roughly one in four of the others are capitalized.
pub fn random_words<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32, max_len: u32) -> String {
    let count = rng.random_range(min..=max.max(min));
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push(' ');
        }
        let length = rng.random_range(2..=max_len.max(2));
        let capitalize = i == 0 || rng.random_range(1..=4) == 2;
        for position in 0..length {
            let letter = LETTERS.choose(rng).copied().unwrap_or(b'a') as char;
            if position == 0 && capitalize {
                out.push(letter.to_ascii_uppercase());
            } else {
                out.push(letter);
            }
        }
    }
    out
}

/// Product SKU: `<PREFIX>-<index:08>-<SUFFIX>`, rendered upper case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku {
    prefix: String,
    index: u64,
    suffix: String,
}

impl Sku {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, prefix: &str, index: u64) -> Self {
        let suffix = (0..SKU_SUFFIX_LEN)
            .map(|_| SKU_ALPHABET.choose(rng).copied().unwrap_or(b'A') as char)
            .collect();
        Self {
            prefix: prefix.to_string(),
            index,
            suffix,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Lower-cased SKU, used as URL key.
    pub fn url_key(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// File stem shared by the product's images: `<suffix>_<index:08>`.
    pub fn image_stem(&self) -> String {
        format!("{}_{:08}", self.suffix.to_lowercase(), self.index)
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:08}-{}",
            self.prefix.to_uppercase(),
            self.index,
            self.suffix.to_uppercase()
        )
    }
}

/// Elapsed time as `hh:mm:ss`; sub-minute durations round up.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = if elapsed < Duration::from_secs(60) {
        elapsed.as_secs_f64().ceil() as u64
    } else {
        elapsed.as_secs()
    };
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn words_respect_count_and_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let text = random_words(&mut rng, 2, 10, 12);
            let words: Vec<&str> = text.split(' ').collect();
            assert!((2..=10).contains(&words.len()), "{text}");
            assert!(words.iter().all(|w| (2..=12).contains(&w.len())), "{text}");
            assert!(words[0].starts_with(|c: char| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn sku_is_upper_case_and_padded() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sku = Sku::random(&mut rng, "oro", 42);
        let rendered = sku.to_string();
        let parts: Vec<&str> = rendered.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORO");
        assert_eq!(parts[1], "00000042");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(rendered, rendered.to_uppercase());
        assert_eq!(sku.url_key(), rendered.to_lowercase());
        assert!(sku.image_stem().ends_with("_00000042"));
    }

    #[test]
    fn elapsed_is_formatted_as_clock() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "00:00:02");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "00:02:05");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
    }
}
