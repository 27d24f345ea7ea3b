//! Frequency search
//!
//! A search visits every position once, asks a match function whether the
//! position is interesting and a count function what to tally it under. The
//! result groups the ordinals (0-based position numbers) of the matches by
//! their key.
use crate::corpus::{Corpus, Position, Positions, StructuralContext};
use crate::errors::*;
use crate::farm::{new_farm, FarmMap};
use crate::stats;
use std::borrow::Borrow;
use std::hash::Hash;
use std::io::BufRead;

/// Frequency, ipm and arf of one index entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub frequency: usize,
    pub ipm: f64,
    pub arf: f64,
}

/// Where each counted key occurred, plus the size of the scanned corpus
#[derive(Debug, Clone)]
pub struct FrequencyIndex<K: Hash + Eq> {
    entries: FarmMap<K, Vec<u64>>,
    size: u64,
}

impl<K: Hash + Eq> FrequencyIndex<K> {
    fn new(entries: FarmMap<K, Vec<u64>>, size: u64) -> Self {
        FrequencyIndex { entries, size }
    }

    /// N, the number of positions scanned, matched or not
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordinals of one key, in stream order
    pub fn get<Q>(&self, key: &Q) -> Option<&[u64]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|v| v.as_slice())
    }

    /// Absolute frequency of a key; 0 if it never matched
    pub fn frequency<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).map_or(0, |o| o.len())
    }

    pub fn ipm<Q>(&self, key: &Q) -> Result<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        stats::ipm(self.get(key).unwrap_or(&[]), self.size)
    }

    pub fn arf<Q>(&self, key: &Q) -> Result<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        stats::arf(self.get(key).unwrap_or(&[]), self.size)
    }

    pub fn stats<Q>(&self, key: &Q) -> Result<Stats>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ordinals = self.get(key).unwrap_or(&[]);
        Ok(Stats {
            frequency: ordinals.len(),
            ipm: stats::ipm(ordinals, self.size)?,
            arf: stats::arf(ordinals, self.size)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[u64])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn into_entries(self) -> FarmMap<K, Vec<u64>> {
        self.entries
    }
}

impl<K: Hash + Eq + Ord> FrequencyIndex<K> {
    /// Entries by decreasing frequency, ties by key
    pub fn most_common(&self) -> Vec<(&K, &[u64])> {
        let mut entries: Vec<(&K, &[u64])> = self.iter().collect();
        entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<'a, R: BufRead> Positions<'a, R> {
    /// Index `count_fn`'s key at every position where `match_fn` holds
    ///
    /// Consumes the scan. On any error no index is returned.
    pub fn search<K, M, C>(self, match_fn: M, mut count_fn: C) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        M: FnMut(&Position, &StructuralContext) -> bool,
        C: FnMut(&Position, &StructuralContext) -> K,
    {
        self.search_many(match_fn, move |p, c| Some(count_fn(p, c)))
    }

    /// Like `search`, but a position can be counted under several keys
    pub fn search_many<K, I, M, C>(
        mut self,
        mut match_fn: M,
        mut count_fn: C,
    ) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
        M: FnMut(&Position, &StructuralContext) -> bool,
        C: FnMut(&Position, &StructuralContext) -> I,
    {
        let mut entries: FarmMap<K, Vec<u64>> = new_farm();
        let mut ordinal: u64 = 0;
        while let Some(position) = self.next() {
            let position = position?;
            let context = self.context();
            if match_fn(&position, &context) {
                for key in count_fn(&position, &context) {
                    let ordinals = entries.entry(key).or_insert_with(Vec::new);
                    // A key repeated at one position is counted once
                    if ordinals.last() != Some(&ordinal) {
                        ordinals.push(ordinal);
                    }
                }
            }
            ordinal += 1;
        }
        info!(
            "Searched {} positions in {:.1}s, {} distinct keys",
            ordinal,
            self.elapsed().as_secs_f64(),
            entries.len()
        );
        Ok(FrequencyIndex::new(entries, ordinal))
    }

    /// Every position where `count_fn` returns `Some(key)` is counted under `key`
    pub fn search_by<K, C>(self, count_fn: C) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        C: FnMut(&Position, &StructuralContext) -> Option<K>,
    {
        self.search_many(|_, _| true, count_fn)
    }
}

impl Corpus {
    /// See [`Positions::search`]; each call scans the file anew
    pub fn search<K, M, C>(&self, match_fn: M, count_fn: C) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        M: FnMut(&Position, &StructuralContext) -> bool,
        C: FnMut(&Position, &StructuralContext) -> K,
    {
        self.positions()?.search(match_fn, count_fn)
    }

    pub fn search_many<K, I, M, C>(&self, match_fn: M, count_fn: C) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
        M: FnMut(&Position, &StructuralContext) -> bool,
        C: FnMut(&Position, &StructuralContext) -> I,
    {
        self.positions()?.search_many(match_fn, count_fn)
    }

    pub fn search_by<K, C>(&self, count_fn: C) -> Result<FrequencyIndex<K>>
    where
        K: Hash + Eq,
        C: FnMut(&Position, &StructuralContext) -> Option<K>,
    {
        self.positions()?.search_by(count_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CorpusProfile;
    use std::io::Cursor;

    const TEXT: &str = "<doc id=\"a\">\n\
                        pes\tpes\tNN\n\
                        štěká\tštěkat\tVB\n\
                        </doc>\n\
                        <doc id=\"b\">\n\
                        psi\tpes\tNN\n\
                        spí\tspát\tVB\n\
                        pes\tpes\tNN\n\
                        </doc>\n";

    fn scan<'a>(text: &str) -> Positions<'a, Cursor<Vec<u8>>> {
        Positions::from_reader(Cursor::new(text.as_bytes().to_vec()), CorpusProfile::basic())
    }

    fn lemma(p: &Position) -> String {
        p.str("lemma").unwrap().to_string()
    }

    #[test]
    fn groups_ordinals_by_key() {
        let index = scan(TEXT)
            .search(|p, _| p.str("tag") == Some("NN"), |p, _| lemma(p))
            .unwrap();
        assert_eq!(index.size(), 5);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("pes"), Some(&[0, 2, 4][..]));
        assert_eq!(index.frequency("pes"), 3);
        assert_eq!(index.frequency("kočka"), 0);
        assert_eq!(index.ipm("pes").unwrap(), 3.0 / 5.0 * 1_000_000.0);
    }

    #[test]
    fn structural_keys() {
        let index = scan(TEXT)
            .search(
                |_, _| true,
                |_, c| c.attribute("doc", "id").unwrap_or("").to_string(),
            )
            .unwrap();
        assert_eq!(index.get("a"), Some(&[0, 1][..]));
        assert_eq!(index.get("b"), Some(&[2, 3, 4][..]));
        let ranked: Vec<&String> = index.most_common().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec!["b", "a"]);
    }

    #[test]
    fn nothing_matches() {
        let index = scan(TEXT).search(|_, _| false, |p, _| lemma(p)).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.size(), 5);
    }

    #[test]
    fn several_keys_per_position_without_duplicates() {
        let index = scan(TEXT)
            .search_many(
                |_, _| true,
                |p, _| vec![lemma(p), lemma(p), p.str("tag").unwrap().to_string()],
            )
            .unwrap();
        assert_eq!(index.get("pes"), Some(&[0, 2, 4][..]));
        assert_eq!(index.get("NN"), Some(&[0, 2, 4][..]));
        assert_eq!(index.get("VB"), Some(&[1, 3][..]));
    }

    #[test]
    fn search_by_option() {
        let index = scan(TEXT)
            .search_by(|p, _| {
                if p.str("tag") == Some("VB") {
                    Some((lemma(p), p.str("tag").unwrap().to_string()))
                } else {
                    None
                }
            })
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&("spát".to_string(), "VB".to_string())),
            Some(&[3][..])
        );
    }

    #[test]
    fn stats_of_an_entry() {
        let index = scan(TEXT)
            .search(|_, _| true, |p, _| lemma(p))
            .unwrap();
        let stats = index.stats("pes").unwrap();
        assert_eq!(stats.frequency, 3);
        // Gaps 2, 2 and the wrap-around 0 + 5 - 4 = 1, capped at 5/3
        let v = 5.0 / 3.0;
        assert!((stats.arf - (v + v + 1.0) / v).abs() < 1e-9);
        assert!(index.arf("missing").is_err());
    }

    #[test]
    fn errors_discard_the_index() {
        let result = scan("pes\tpes\tNN\n<p>\n</s>\n").search(|_, _| true, |p, _| lemma(p));
        let err = result.unwrap_err();
        assert_eq!(err.format().unwrap().line, 3);
    }
}
