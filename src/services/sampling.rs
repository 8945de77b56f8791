// 随机抽题
// 在候选集合上均匀、无放回地抽取；数量超过候选数时取全部。

use rand::seq::{index, SliceRandom};
use rand::Rng;

/// 从 `len` 个位置中无放回抽取 `amount` 个下标
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    let amount = amount.min(len);
    if amount == 0 {
        return Vec::new();
    }
    index::sample(rng, len, amount).into_vec()
}

/// 无放回抽取元素，消耗原集合
pub fn sample<T, R: Rng + ?Sized>(rng: &mut R, items: Vec<T>, amount: usize) -> Vec<T> {
    if amount >= items.len() {
        let mut items = items;
        shuffle(rng, &mut items);
        return items;
    }
    let mut picked = sample_indices(rng, items.len(), amount);
    picked.sort_unstable();

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut out: Vec<T> = picked.iter().filter_map(|&i| slots[i].take()).collect();
    shuffle(rng, &mut out);
    out
}

fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    items.shuffle(rng);
}
