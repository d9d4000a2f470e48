//! ベクトル類似度の計算

/// コサイン類似度（-1.0〜1.0）
///
/// 次元不一致・空ベクトル・ゼロノルムは比較不能として `None`。
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = x as f64;
        let y = y as f64;
        dot = x.mul_add(y, dot);
        norm_a = x.mul_add(x, norm_a);
        norm_b = y.mul_add(y, norm_b);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-12 || !denom.is_finite() {
        return None;
    }

    let score = dot / denom;
    if score.is_nan() {
        return None;
    }
    Some(score.clamp(-1.0, 1.0))
}

/// ベクトルの平均（文書ベクトル用）
pub fn mean_vector<'a, I>(vectors: I) -> Option<Vec<f32>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut sum: Option<Vec<f32>> = None;
    let mut count = 0usize;

    for v in vectors {
        match sum.as_mut() {
            None => sum = Some(v.to_vec()),
            Some(acc) => {
                // 次元の異なるベクトルは無視
                if acc.len() != v.len() {
                    continue;
                }
                for (a, x) in acc.iter_mut().zip(v) {
                    *a += *x;
                }
            }
        }
        count += 1;
    }

    let mut sum = sum?;
    let n = count as f32;
    for a in sum.iter_mut() {
        *a /= n;
    }
    Some(sum)
}
