//! Extended grapheme cluster frequencies, `wc -c` on steroids
use crate::errors::*;
use crate::farm::FarmMap;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// A Unicode normalization form clusters are expected to be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl NormalizationForm {
    pub fn normalize(self, text: &str) -> String {
        match self {
            NormalizationForm::Nfc => text.nfc().collect(),
            NormalizationForm::Nfd => text.nfd().collect(),
            NormalizationForm::Nfkc => text.nfkc().collect(),
            NormalizationForm::Nfkd => text.nfkd().collect(),
        }
    }
}

impl FromStr for NormalizationForm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_uppercase().as_str() {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFKC" => Ok(NormalizationForm::Nfkc),
            "NFKD" => Ok(NormalizationForm::Nfkd),
            _ => Err(Error::Other(format!(
                "Unknown normalization form {:?}, expected NFC, NFD, NFKC or NFKD",
                name
            ))),
        }
    }
}

/// Tally the extended grapheme clusters of `text` into `counts`
pub fn count_graphemes(text: &str, lower: bool, counts: &mut FarmMap<String, u64>) {
    let lowered;
    let text = if lower {
        lowered = text.to_lowercase();
        &lowered
    } else {
        text
    };
    for cluster in text.graphemes(true) {
        match counts.get_mut(cluster) {
            Some(count) => *count += 1,
            None => {
                counts.insert(cluster.to_string(), 1);
            }
        }
    }
}

/// Clusters by decreasing count, ties by the cluster itself
pub fn most_common(counts: &FarmMap<String, u64>) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Clusters that change under `form`, each with its normalized text, in cluster order
pub fn denormalized(counts: &FarmMap<String, u64>, form: NormalizationForm) -> Vec<(&str, String)> {
    let mut found: Vec<(&str, String)> = counts
        .keys()
        .filter_map(|cluster| {
            let normalized = form.normalize(cluster);
            if normalized != *cluster {
                Some((cluster.as_str(), normalized))
            } else {
                None
            }
        })
        .collect();
    found.sort();
    found
}

/// Code points of a cluster, e.g. `U+0063+U+030C`
pub fn code_points(cluster: &str) -> String {
    cluster
        .chars()
        .map(|c| format!("U+{:04X}", c as u32))
        .collect::<Vec<_>>()
        .join("+")
}

/// The cluster itself, or its escaped form when it contains control characters
pub fn printable(cluster: &str) -> String {
    if cluster.chars().any(char::is_control) {
        cluster.escape_debug().to_string()
    } else {
        cluster.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::new_farm;

    #[test]
    fn combining_marks_stay_with_their_base() {
        let mut counts = new_farm();
        // "č" as c + combining caron, twice, and one precomposed "č"
        count_graphemes("c\u{30C}c\u{30C}\u{10D}", false, &mut counts);
        assert_eq!(counts["c\u{30C}"], 2);
        assert_eq!(counts["\u{10D}"], 1);
        assert_eq!(counts.len(), 2);
        assert_eq!(
            most_common(&counts),
            vec![("c\u{30C}", 2), ("\u{10D}", 1)]
        );
    }

    #[test]
    fn lowercasing_merges_cases() {
        let mut counts = new_farm();
        count_graphemes("Aa\r\n", true, &mut counts);
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["\r\n"], 1);
    }

    #[test]
    fn normalization_check() {
        let mut counts = new_farm();
        count_graphemes("c\u{30C}\u{10D}a", false, &mut counts);
        let nfc: NormalizationForm = "nfc".parse().unwrap();
        assert_eq!(
            denormalized(&counts, nfc),
            vec![("c\u{30C}", "\u{10D}".to_string())]
        );
        assert_eq!(
            denormalized(&counts, NormalizationForm::Nfd),
            vec![("\u{10D}", "c\u{30C}".to_string())]
        );
        assert!("NFX".parse::<NormalizationForm>().is_err());
    }

    #[test]
    fn describing_clusters() {
        assert_eq!(code_points("c\u{30C}"), "U+0063+U+030C");
        assert_eq!(printable("\r\n"), "\\r\\n");
        assert_eq!(printable("ř"), "ř");
    }
}
