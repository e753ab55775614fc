//! Per-sample replicate statistics.

use crate::data::model::{GeneRecord, RawGene, RawSample, SampleStat};

/// Mean, sample SD (n - 1), CV and range over the present counts.
///
/// Missing counts are excluded. Mean and range need one value, SD needs two,
/// and CV is undefined whenever the mean is exactly zero.
pub fn sample_stat(sample: &RawSample) -> SampleStat {
    let values: Vec<f64> = sample.counts.iter().flatten().copied().collect();
    let n = values.len();

    let mean = (n > 0).then(|| values.iter().sum::<f64>() / n as f64);

    let sd = match mean {
        Some(m) if n > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    let cv = match (sd, mean) {
        (Some(s), Some(m)) if m != 0.0 => Some(s / m),
        _ => None,
    };

    let range = (n > 0).then(|| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        max - min
    });

    SampleStat {
        gene: sample.gene.clone(),
        sample: sample.label,
        mean,
        sd,
        cv,
        range,
    }
}

/// One [`SampleStat`] per ingested sample, in column order.
pub fn gene_record(raw: &RawGene) -> GeneRecord {
    GeneRecord {
        gene: raw.gene.clone(),
        stats: raw.samples.iter().map(sample_stat).collect(),
    }
}

/// Mean of the defined values, `None` when there are none.
pub fn mean_defined(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SampleLabel;

    fn raw(counts: &[Option<f64>]) -> RawSample {
        RawSample {
            gene: "g".to_string(),
            label: SampleLabel::M1,
            counts: counts.to_vec(),
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn basic_statistics() {
        let st = sample_stat(&raw(&[Some(100.0), Some(150.0), Some(5000.0)]));
        assert!(close(st.mean, 1750.0));
        assert!(close(st.range, 4900.0));
        // ((-1650)^2 + (-1600)^2 + 3250^2) / 2
        assert!(close(st.sd, 7_922_500f64.sqrt()));
        assert!((st.cv.unwrap() - st.sd.unwrap() / 1750.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mean_leaves_cv_undefined() {
        let st = sample_stat(&raw(&[Some(0.0), Some(0.0), Some(0.0)]));
        assert_eq!(st.mean, Some(0.0));
        assert_eq!(st.sd, Some(0.0));
        assert_eq!(st.cv, None);
        assert_eq!(st.range, Some(0.0));

        let st = sample_stat(&raw(&[Some(-1.0), Some(1.0)]));
        assert_eq!(st.cv, None);
    }

    #[test]
    fn missing_values_are_excluded() {
        let st = sample_stat(&raw(&[Some(10.0), None, Some(12.0)]));
        assert!(close(st.mean, 11.0));
        assert!(close(st.range, 2.0));
        assert!(close(st.sd, 2f64.sqrt()));
    }

    #[test]
    fn too_few_values() {
        let st = sample_stat(&raw(&[None, Some(5.0)]));
        assert!(close(st.mean, 5.0));
        assert_eq!(st.sd, None);
        assert_eq!(st.cv, None);

        let st = sample_stat(&raw(&[None, None]));
        assert_eq!(st.mean, None);
        assert_eq!(st.range, None);
    }

    #[test]
    fn mean_defined_skips_none() {
        assert_eq!(mean_defined([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean_defined([None, None]), None);
    }
}
