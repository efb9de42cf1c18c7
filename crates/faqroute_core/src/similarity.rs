use tracing::debug;

/// Terms that mark two questions as being about the same topic.
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub name: &'static str,
    pub terms: &'static [&'static str],
}

impl KeywordGroup {
    /// Substring match against already-lowercased text.
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.terms.iter().any(|t| text.contains(t))
    }
}

pub const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        name: "salary",
        terms: &["salary", "salaries", "pay", "paid", "credited", "credit"],
    },
    KeywordGroup {
        name: "leave",
        terms: &["leave", "leaves", "paid leave", "pto", "vacation"],
    },
    KeywordGroup {
        name: "password",
        terms: &["password", "reset", "forgot", "change password"],
    },
];

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))` over chars.
///
/// Two empty strings are identical (1.0). Matching blocks are found the same way
/// a longest-common-substring recursion would: longest block first (earliest in
/// `a`, then earliest in `b` on ties), then recurse on both sides of it.
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2.0 * matched_chars(&a, &b) as f64 / total as f64) as f32
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    // run[j + 1] = length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Adds `increment` once per keyword group that both texts mention.
pub fn keyword_boost(question: &str, candidate: &str, increment: f32) -> f32 {
    let question = question.to_lowercase();
    let candidate = candidate.to_lowercase();

    KEYWORD_GROUPS
        .iter()
        .filter(|group| group.mentioned_in(&question) && group.mentioned_in(&candidate))
        .inspect(|group| debug!(group = group.name, "keyword boost applied"))
        .count() as f32
        * increment
}

/// Blended score: similarity of the normalized strings plus keyword boosts.
/// Can exceed 1.0 once boosts apply.
pub fn score(question: &str, candidate: &str, boost: f32) -> f32 {
    let question = normalize(question);
    let candidate = normalize(candidate);
    sequence_ratio(&question, &candidate) + keyword_boost(&question, &candidate, boost)
}

pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
