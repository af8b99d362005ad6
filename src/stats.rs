//! Sorting and median helpers shared by both estimators.
//! 两个估计器共用的排序与中位数工具。

/// Sorts a short sequence in ascending order with an insertion sort.
///
/// Equal elements keep their relative order. Samples never exceed the capture
/// buffer capacity, so the quadratic worst case is irrelevant here.
///
/// 使用插入排序将短序列升序排列，相等元素保持相对顺序。
pub fn insertion_sort(values: &mut [f64]) {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 && values[j] < values[j - 1] {
            values.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Returns the median of `values` as both estimators define it.
///
/// The samples are sorted, then the entries at `n/2` and `n/2 + 1` are
/// averaged. Both indices are clamped to the last sample, so one sample yields
/// itself and two samples yield the larger one. An empty set has no median.
///
/// 返回两个估计器所定义的中位数：排序后取 `n/2` 与 `n/2 + 1` 两处的平均值，
/// 两个下标都不超过最后一个样本。空集合没有中位数。
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    insertion_sort(values);

    let last = values.len() - 1;
    let lower = (values.len() / 2).min(last);
    let upper = (values.len() / 2 + 1).min(last);
    Some((values[lower] + values[upper]) / 2.0)
}

/// Arithmetic mean, or `None` for an empty set.
/// 算术平均值，空集合返回 `None`。
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_sort() {
        let mut values = vec![5.0, 1.0, 4.0, 1.0, 3.0];
        insertion_sort(&mut values);
        assert_eq!(values, vec![1.0, 1.0, 3.0, 4.0, 5.0]);

        let mut empty: Vec<f64> = Vec::new();
        insertion_sort(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_median_uses_upper_pair() {
        // Sorted: [1, 2, 3, 4] -> (3 + 4) / 2
        let mut even = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut even), Some(3.5));

        // Sorted: [1, 2, 3, 4, 5] -> (3 + 4) / 2
        let mut odd = vec![5.0, 3.0, 1.0, 4.0, 2.0];
        assert_eq!(median(&mut odd), Some(3.5));
    }

    #[test]
    fn test_median_small_sets_stay_in_bounds() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [7.0]), Some(7.0));
        assert_eq!(median(&mut [9.0, 2.0]), Some(9.0));
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_of_identical_values_is_exact() {
        let mut values = vec![8.0; 17];
        assert_eq!(median(&mut values), Some(8.0));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }
}
