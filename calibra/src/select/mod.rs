//! Master selection.
//!
//! Every selector first keeps the masters whose matching fields equal the
//! light's, then ranks the survivors by signed day delta
//! (`light date - master date`, non-negative when the master came first).
//!
//! Bias and dark prefer the closest master taken on or before the light and
//! fall back to the closest later one. Flats prefer anything inside the
//! session window around the light, then the most recent earlier flat, then
//! the closest later flat.


use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::date::days_between;
use crate::frame::{FrameRecord, FrameType};
use crate::validate::{is_valid_bias, is_valid_dark, is_valid_flat};

/// Default half-width of the flat session window, in days (inclusive).
pub const DEFAULT_FLAT_WINDOW_DAYS: i64 = 3;

/// A pooled master with its observation day already parsed.
#[derive(Debug, Clone, Copy)]
pub struct Master<'a> {
    pub record: &'a FrameRecord,
    pub date: NaiveDate,
}

/// Valid, dated masters split by type.
#[derive(Debug, Default)]
pub struct MasterPools<'a> {
    pub bias: Vec<Master<'a>>,
    pub dark: Vec<Master<'a>>,
    pub flat: Vec<Master<'a>>,
}

impl<'a> MasterPools<'a> {
    /// Splits `masters` by type tag.
    ///
    /// Records that fail their type's validator, carry an unparseable date, or
    /// have no recognized type are left out.
    pub fn partition(masters: &'a [FrameRecord]) -> Self {
        let mut pools = Self::default();

        for record in masters {
            let (pool, valid) = match record.frame_type {
                Some(FrameType::Bias) => (&mut pools.bias, is_valid_bias(record)),
                Some(FrameType::Dark) => (&mut pools.dark, is_valid_dark(record)),
                Some(FrameType::Flat) => (&mut pools.flat, is_valid_flat(record)),
                Some(FrameType::Light) | None => {
                    tracing::debug!(path = %record.path, "Ignoring master without a master type");
                    continue;
                }
            };

            if !valid {
                tracing::debug!(path = %record.path, "Ignoring incomplete master");
                continue;
            }
            let Some(date) = record.observation_date() else {
                tracing::debug!(
                    path = %record.path,
                    date = record.date.as_deref().unwrap_or_default(),
                    "Ignoring master with unparseable date"
                );
                continue;
            };

            pool.push(Master { record, date });
        }

        pools
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_empty() && self.dark.is_empty() && self.flat.is_empty()
    }

    /// Runs all three selectors for one light.
    pub fn select(&self, light: &FrameRecord, flat_window_days: i64) -> Selection<'a> {
        Selection {
            bias: select_bias(light, &self.bias),
            dark: select_dark(light, &self.dark),
            flat: select_flat(light, &self.flat, flat_window_days),
        }
    }
}

/// The masters chosen for one light; any of them may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub bias: Option<&'a FrameRecord>,
    pub dark: Option<&'a FrameRecord>,
    pub flat: Option<&'a FrameRecord>,
}

/// Masters selected for every type.
#[derive(Debug, Clone, Copy)]
pub struct CompleteSelection<'a> {
    pub bias: &'a FrameRecord,
    pub dark: &'a FrameRecord,
    pub flat: &'a FrameRecord,
}

impl<'a> Selection<'a> {
    pub fn complete(&self) -> Option<CompleteSelection<'a>> {
        Some(CompleteSelection {
            bias: self.bias?,
            dark: self.dark?,
            flat: self.flat?,
        })
    }
}

fn matches_electronics(light: &FrameRecord, master: &FrameRecord) -> bool {
    master.setup == light.setup
        && master.readout == light.readout
        && master.gain == light.gain
        && master.offset == light.offset
        && master.usb == light.usb
        && master.binning == light.binning
        && master.temp_c == light.temp_c
}

fn matches_optics(light: &FrameRecord, master: &FrameRecord) -> bool {
    master.setup == light.setup && master.filter == light.filter && master.binning == light.binning
}

pub fn select_bias<'a>(light: &FrameRecord, pool: &[Master<'a>]) -> Option<&'a FrameRecord> {
    let light_date = light.observation_date()?;
    let candidates = pool
        .iter()
        .filter(|m| matches_electronics(light, m.record));
    nearest_prior_else_future(light_date, candidates).map(|m| m.record)
}

/// Like [`select_bias`], with the exposure matched exactly (whole seconds).
/// No exposure scaling is attempted.
pub fn select_dark<'a>(light: &FrameRecord, pool: &[Master<'a>]) -> Option<&'a FrameRecord> {
    let light_date = light.observation_date()?;
    let exposure = light.exposure_key()?;
    let candidates = pool.iter().filter(|m| {
        matches_electronics(light, m.record) && m.record.exposure_key() == Some(exposure)
    });
    nearest_prior_else_future(light_date, candidates).map(|m| m.record)
}

pub fn select_flat<'a>(
    light: &FrameRecord,
    pool: &[Master<'a>],
    window_days: i64,
) -> Option<&'a FrameRecord> {
    let light_date = light.observation_date()?;
    let candidates: Vec<(i64, &Master<'a>)> = pool
        .iter()
        .filter(|m| matches_optics(light, m.record))
        .map(|m| (days_between(light_date, m.date), m))
        .collect();

    let in_window = candidates
        .iter()
        .filter(|(delta, _)| delta.abs() <= window_days)
        .min_by(|a, b| window_order(*a, *b));
    if let Some((_, m)) = in_window {
        return Some(m.record);
    }

    // Latest earlier flat: smallest non-negative delta.
    let latest_prior = candidates
        .iter()
        .filter(|(delta, _)| *delta >= 0)
        .min_by_key(|(delta, _)| *delta);
    if let Some((_, m)) = latest_prior {
        return Some(m.record);
    }

    candidates
        .iter()
        .min_by_key(|(delta, _)| delta.abs())
        .map(|(_, m)| m.record)
}

/// Closest first; at equal distance an earlier flat beats a later one, then
/// the more recent date wins.
fn window_order(a: &(i64, &Master<'_>), b: &(i64, &Master<'_>)) -> Ordering {
    let (da, ma) = a;
    let (db, mb) = b;
    da.abs()
        .cmp(&db.abs())
        .then_with(|| (*da < 0).cmp(&(*db < 0)))
        .then_with(|| mb.date.cmp(&ma.date))
}

/// Bias/dark ranking. Among masters on or before the light, the smallest
/// delta wins and equal deltas go to the later date; otherwise the closest
/// later master. Remaining ties keep the first candidate in pool order.
fn nearest_prior_else_future<'m, 'a: 'm>(
    light_date: NaiveDate,
    candidates: impl Iterator<Item = &'m Master<'a>>,
) -> Option<&'m Master<'a>> {
    let mut best_prior: Option<(i64, &'m Master<'a>)> = None;
    let mut best_future: Option<(i64, &'m Master<'a>)> = None;

    for m in candidates {
        let delta = days_between(light_date, m.date);
        if delta >= 0 {
            let better = match best_prior {
                None => true,
                Some((best_delta, best)) => {
                    delta < best_delta || (delta == best_delta && m.date > best.date)
                }
            };
            if better {
                best_prior = Some((delta, m));
            }
        } else {
            let distance = -delta;
            if best_future.map_or(true, |(best_distance, _)| distance < best_distance) {
                best_future = Some((distance, m));
            }
        }
    }

    best_prior.or(best_future).map(|(_, m)| m)
}
