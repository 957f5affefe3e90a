//! Feature pipeline integration: cleaner through assembler on synthetic
//! commodity data.

use chrono::{Duration, NaiveDate};
use pricecast_core::data::clean;
use pricecast_core::features::{add_lags, assemble, encode, IndicatorEngine, LagConfig};
use pricecast_core::indicators::rolling::lead;
use pricecast_core::{ColumnName, Frame};
use pricecast_synthetic::{commodity_basket, random_walk, SyntheticSeries, WalkSpec};

fn price() -> ColumnName {
    ColumnName::raw("price").unwrap()
}

fn frame_of(series: Vec<SyntheticSeries>) -> Frame {
    let mut frame = Frame::new(series[0].dates.clone());
    for s in series {
        frame.insert(ColumnName::raw(&s.name).unwrap(), s.values).unwrap();
    }
    frame
}

/// Clean, derive every feature family and attach a lead-1 target.
fn features(frame: &Frame) -> Frame {
    let (cleaned, _) = clean(frame);
    let mut full = IndicatorEngine::standard()
        .compute_indicators(&cleaned, &price())
        .unwrap();
    full = add_lags(&full, &price(), &LagConfig::default()).unwrap();
    full = encode(&full);
    let target = lead(cleaned.column(&price()).unwrap(), 1);
    full.insert(ColumnName::Target(1), target).unwrap();
    full
}

/// NaN-aware equality.
fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

#[test]
fn planted_outlier_is_replaced_by_its_predecessor() {
    let mut basket = commodity_basket(400, 3);
    let planted = basket[0].plant_outlier(200, 10.0);
    let frame = frame_of(basket);

    let (cleaned, report) = clean(&frame);
    let values = cleaned.column(&price()).unwrap();

    assert_ne!(values[200], planted);
    assert!(values[200] < planted / 2.0);
    assert_eq!(values[200], values[199]);
    assert!(report.outliers.get(&price()).copied().unwrap_or(0) >= 1);
    assert_eq!(cleaned.len(), 400);
}

#[test]
fn thirty_rows_define_sma_30_on_last_row_only() {
    let series = random_walk(&WalkSpec::new("price", 30).seed(5));
    let frame = frame_of(vec![series]);
    let out = IndicatorEngine::standard()
        .compute_indicators(&frame, &price())
        .unwrap();

    let sma_30 = out.column(&ColumnName::Sma(30)).unwrap();
    assert!(sma_30[..29].iter().all(|v| v.is_nan()));
    assert!(sma_30[29].is_finite());
}

#[test]
fn exogenous_series_survive_as_features() {
    let frame = frame_of(commodity_basket(200, 8));
    let assembled = assemble(&features(&frame), &ColumnName::Target(1)).unwrap();

    let columns = assembled.matrix.columns();
    for name in ["price", "iron_ore_price", "coal_price", "usd_mxn_rate"] {
        assert!(columns.contains(&ColumnName::raw(name).unwrap()), "{name} missing");
    }
    assert!(columns.contains(&ColumnName::Rsi(14)));
    assert!(columns.contains(&ColumnName::MonthSin));
    assert!(columns.contains(&ColumnName::Lag(30)));
    assert_eq!(assembled.matrix.missing_count(), 0);
    // Lag-30 warmup plus the final row without a target.
    assert_eq!(assembled.len(), 200 - 31);
}

#[test]
fn features_are_deterministic() {
    let frame = frame_of(commodity_basket(250, 21));
    let a = features(&frame);
    let b = features(&frame);

    assert_eq!(a.width(), b.width());
    for (name, values) in a.columns() {
        assert!(same_bits(values, b.column(name).unwrap()), "{name} differs");
    }
    let ma = assemble(&a, &ColumnName::Target(1)).unwrap();
    let mb = assemble(&b, &ColumnName::Target(1)).unwrap();
    assert_eq!(ma, mb);
}

/// Features at row t computed from rows 0..=t equal those computed from the
/// full history. The target column looks ahead by construction and is
/// excluded.
#[test]
fn no_feature_looks_ahead() {
    let series = random_walk(&WalkSpec::new("price", 240).seed(17));
    let full_frame = frame_of(vec![series.clone()]);
    let cut = 150;
    let truncated = Frame::new(series.dates[..cut].to_vec())
        .with_column(price(), series.values[..cut].to_vec())
        .unwrap();

    let engine = IndicatorEngine::standard();
    let build = |f: &Frame| {
        let with_ind = engine.compute_indicators(f, &price()).unwrap();
        encode(&add_lags(&with_ind, &price(), &LagConfig::default()).unwrap())
    };
    let full = build(&full_frame);
    let part = build(&truncated);

    for (name, values) in part.columns() {
        let whole = full.column(name).unwrap();
        assert!(same_bits(values, &whole[..cut]), "{name} looks ahead");
    }
}

#[test]
fn duplicate_and_unsorted_dates_are_normalized() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let dates = vec![
        start + Duration::days(2),
        start,
        start + Duration::days(1),
        start + Duration::days(1),
    ];
    let frame = Frame::new(dates)
        .with_column(price(), vec![12.0, 10.0, 10.5, 11.0])
        .unwrap();

    let (cleaned, report) = clean(&frame);
    assert_eq!(
        cleaned.dates(),
        &[start, start + Duration::days(1), start + Duration::days(2)]
    );
    assert_eq!(cleaned.column(&price()).unwrap(), &[10.0, 11.0, 12.0]);
    assert_eq!(report.duplicates_removed, 1);
}
