use lttb_trace::{downsample, select, ChannelSet, ImuSample, Record};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn imu_strategy() -> impl Strategy<Value = ImuSample> {
    prop::array::uniform6(any::<i16>()).prop_map(|raw| ImuSample {
        ax: raw[0],
        ay: raw[1],
        az: raw[2],
        gx: raw[3],
        gy: raw[4],
        gz: raw[5],
    })
}

// A series plus a threshold anywhere in [0, len + 2].
fn series_case_strategy() -> impl Strategy<Value = (Vec<ImuSample>, usize)> {
    prop::collection::vec(imu_strategy(), 1..400).prop_flat_map(|data| {
        let n = data.len();
        (Just(data), 0..=n + 2)
    })
}

fn channel_subset_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(ImuSample::CHANNELS.to_vec(), 1..=ImuSample::CHANNELS.len())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn output_length_matches_threshold(
        (data, threshold) in series_case_strategy(),
        names in channel_subset_strategy(),
    ) {
        let channels = ChannelSet::<ImuSample>::new(&names).unwrap();
        let n = data.len();
        let result = select(&data, threshold, &channels);

        if threshold == 1 && n > 1 {
            prop_assert!(result.is_err());
        } else {
            let indices = result.unwrap();
            if threshold > 0 && threshold < n {
                prop_assert_eq!(indices.len(), threshold);
            } else {
                prop_assert_eq!(indices, (0..n).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn endpoints_kept_and_selection_moves_forward(
        (data, threshold) in series_case_strategy(),
        names in channel_subset_strategy(),
    ) {
        prop_assume!(threshold >= 2);
        let channels = ChannelSet::<ImuSample>::new(&names).unwrap();
        let indices = select(&data, threshold, &channels).unwrap();

        prop_assert_eq!(indices[0], 0);
        prop_assert_eq!(*indices.last().unwrap(), data.len() - 1);
        for pair in indices.windows(2) {
            prop_assert!(pair[0] < pair[1], "selection went backwards: {:?}", pair);
        }

        let sampled = downsample(&data, threshold, &channels).unwrap();
        for (sample, &i) in sampled.iter().zip(&indices) {
            prop_assert!(std::ptr::eq(*sample, &data[i]));
        }
    }

    #[test]
    fn repeated_calls_are_deterministic(
        (data, threshold) in series_case_strategy(),
        names in channel_subset_strategy(),
    ) {
        prop_assume!(threshold != 1);
        let channels = ChannelSet::<ImuSample>::new(&names).unwrap();
        let first = select(&data, threshold, &channels).unwrap();
        let second = select(&data, threshold, &channels).unwrap();
        prop_assert_eq!(first, second);
    }
}
