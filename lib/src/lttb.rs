use std::ops::Range;

use log::debug;

use crate::{ChannelSet, Error, Record, Result};

/// Largest Triangle Three Buckets (LTTB) downsampling over several channels.
///
/// Reduces `data` to exactly `threshold` samples while preserving the visual
/// shape of every selected channel. The first and last samples are always
/// kept; each interior slot picks the sample of its bucket that spans the
/// largest triangle with the previous pick and the average of the next
/// bucket. Each channel is its own (index, value) plane and the areas of
/// all selected channels are summed, so a spike in any channel wins.
///
/// Returns the whole input unchanged if `threshold == 0` or
/// `threshold >= data.len()`. A `threshold` of 1 cannot hold both endpoints
/// and fails with [`Error::DegenerateInput`].
pub fn downsample<'a, S: Record>(
    data: &'a [S],
    threshold: usize,
    channels: &ChannelSet<S>,
) -> Result<Vec<&'a S>> {
    Ok(select(data, threshold, channels)?
        .into_iter()
        .map(|i| &data[i])
        .collect())
}

/// Same as [`downsample`] but returns the indices of the selected samples.
///
/// Indices are strictly increasing, start at 0 and end at `data.len() - 1`.
pub fn select<S: Record>(
    data: &[S],
    threshold: usize,
    channels: &ChannelSet<S>,
) -> Result<Vec<usize>> {
    let n = data.len();
    if threshold == 0 || threshold >= n {
        return Ok((0..n).collect());
    }
    if threshold < 2 {
        return Err(Error::DegenerateInput { len: n, threshold });
    }

    let mut sampled = Vec::with_capacity(threshold);
    sampled.push(0);

    if threshold > 2 {
        let bucket_size = (n - 2) as f64 / (threshold - 2) as f64;
        let edge = |i: usize| (i as f64 * bucket_size).floor() as usize + 1;

        let cols = channels.indices();
        let mut avg = vec![0.0f64; cols.len()];
        let mut anchor = vec![0.0f64; cols.len()];
        let mut a_idx = 0usize;

        for i in 1..threshold - 1 {
            let avg_x = average(data, edge(i)..edge(i + 1).min(n), cols, &mut avg);

            let mut bucket = edge(i - 1)..edge(i).min(n - 1);
            if bucket.is_empty() {
                let nearest = bucket.start.max(a_idx + 1).min(n - 2);
                bucket = nearest..nearest + 1;
            }

            for (v, &c) in anchor.iter_mut().zip(cols) {
                *v = data[a_idx].channel(c);
            }
            let ax = a_idx as f64;

            let mut max_area = -1.0f64;
            let mut max_idx = bucket.start;

            for (j, item) in data.iter().enumerate().take(bucket.end).skip(bucket.start) {
                let x = j as f64;
                let area: f64 = cols
                    .iter()
                    .zip(anchor.iter().zip(&avg))
                    .map(|(&c, (&ay, &avg_y))| {
                        ((ax - avg_x) * (item.channel(c) - ay) - (ax - x) * (avg_y - ay)).abs()
                    })
                    .sum();
                if area > max_area {
                    max_area = area;
                    max_idx = j;
                }
            }

            sampled.push(max_idx);
            a_idx = max_idx;
        }
    }

    sampled.push(n - 1);

    debug!(
        "lttb: {} -> {} samples over {:?}",
        n,
        sampled.len(),
        channels
    );
    Ok(sampled)
}

// Writes the per-channel mean of `span` into `avg` and returns the mean index.
// An empty span falls back to the last sample.
fn average<S: Record>(data: &[S], span: Range<usize>, cols: &[usize], avg: &mut [f64]) -> f64 {
    if span.is_empty() {
        let last = data.len() - 1;
        for (v, &c) in avg.iter_mut().zip(cols) {
            *v = data[last].channel(c);
        }
        return last as f64;
    }

    avg.iter_mut().for_each(|v| *v = 0.0);
    for item in &data[span.clone()] {
        for (v, &c) in avg.iter_mut().zip(cols) {
            *v += item.channel(c);
        }
    }

    let len = span.len() as f64;
    avg.iter_mut().for_each(|v| *v /= len);
    (span.start + span.end - 1) as f64 / 2.0
}
