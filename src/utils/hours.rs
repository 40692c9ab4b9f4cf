use std::collections::BTreeMap;

use tracing::warn;

use crate::model::attendance::Attendance;

/// Parse an `HH:MM` wall-clock string into (hour, minute).
fn parse_hhmm(value: &str) -> Option<(i64, i64)> {
    let (h, m) = value.split_once(':')?;
    let hour: i64 = h.trim().parse().ok()?;
    let minute: i64 = m.trim().parse().ok()?;
    if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
        return None;
    }
    Some((hour, minute))
}

/// Total worked hours per person.
///
/// A checkout clock-hour numerically below the check-in hour means the
/// shift ran past midnight, so the checkout side gains 24 hours before
/// differencing. The comparison is on hours only: a checkout earlier in
/// the same clock hour as the check-in is taken at face value.
///
/// Records whose times do not parse are skipped, not fatal. Totals are
/// unrounded; display precision is the caller's concern.
pub fn aggregate_hours(rows: &[Attendance]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for row in rows {
        let (Some((in_h, in_m)), Some((out_h, out_m))) =
            (parse_hhmm(&row.giris), parse_hhmm(&row.cikis))
        else {
            warn!(
                id = row.id,
                giris = %row.giris,
                cikis = %row.cikis,
                "Skipping attendance record with unparsable times"
            );
            continue;
        };

        let out_h = if out_h < in_h { out_h + 24 } else { out_h };
        let worked = ((out_h * 60 + out_m) - (in_h * 60 + in_m)) as f64 / 60.0;

        *totals.entry(row.name.clone()).or_insert(0.0) += worked;
    }

    totals
}
