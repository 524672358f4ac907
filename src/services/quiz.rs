// 答题模式：随机抽取未出现过的题目

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use super::database::Question;

/// 从候选集中排除已答题目后随机取一道
///
/// 候选集全部出现过时返回 `None`。
pub fn select_unseen<'a, R: Rng + ?Sized>(
    candidates: &'a [Question],
    previous: &[i64],
    rng: &mut R,
) -> Option<&'a Question> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let remaining: Vec<&Question> = candidates
        .iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();

    remaining.choose(rng).copied()
}
