//! Trading calendar and weekly rebalance schedule.
//!
//! The calendar is the sorted set of distinct dates present in the scored
//! observations. A rebalance anchor is a calendar day falling on the anchor
//! weekday that has a following trading day; execution always happens on
//! that following day (position + 1), so holidays and weekends never shift
//! the signal into the future.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashMap};

use crate::domain::error::MomentumError;
use crate::domain::observation::ScoredObservation;

/// Weekly rebalance anchor weekday.
pub const REBALANCE_WEEKDAY: Weekday = Weekday::Fri;

#[derive(Debug, Clone, PartialEq)]
pub struct TradingCalendar {
    days: Vec<NaiveDate>,
    positions: HashMap<NaiveDate, usize>,
}

impl TradingCalendar {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let days: Vec<NaiveDate> = unique.into_iter().collect();
        let positions = days.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Self { days, positions }
    }

    pub fn from_observations(observations: &[ScoredObservation]) -> Self {
        Self::from_dates(observations.iter().map(|o| o.date))
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.positions.get(&date).copied()
    }

    pub fn day(&self, position: usize) -> Option<NaiveDate> {
        self.days.get(position).copied()
    }

    /// The trading day right after `date` in the calendar.
    pub fn next_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.position(date).and_then(|pos| self.day(pos + 1))
    }
}

/// A signal day and the session its portfolio is entered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceAnchor {
    pub signal_date: NaiveDate,
    pub trade_date: NaiveDate,
    pub trade_position: usize,
}

/// Two consecutive anchors: enter on `current.trade_date`, exit on
/// `next.trade_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalancePeriod {
    pub current: RebalanceAnchor,
    pub next: RebalanceAnchor,
}

impl RebalancePeriod {
    /// Holding length in trading days between the two execution dates.
    pub fn hold_days(&self) -> usize {
        self.next.trade_position - self.current.trade_position
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceSchedule {
    anchors: Vec<RebalanceAnchor>,
}

impl RebalanceSchedule {
    /// Builds the schedule, failing when fewer than two anchors exist.
    pub fn build(calendar: &TradingCalendar, weekday: Weekday) -> Result<Self, MomentumError> {
        let anchors: Vec<RebalanceAnchor> = calendar
            .days()
            .iter()
            .enumerate()
            .filter(|(_, day)| day.weekday() == weekday)
            .filter_map(|(pos, &signal_date)| {
                calendar.day(pos + 1).map(|trade_date| RebalanceAnchor {
                    signal_date,
                    trade_date,
                    trade_position: pos + 1,
                })
            })
            .collect();

        if anchors.len() < 2 {
            return Err(MomentumError::InsufficientSchedule {
                anchors: anchors.len(),
            });
        }

        Ok(Self { anchors })
    }

    pub fn anchors(&self) -> &[RebalanceAnchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Consecutive anchor pairs in chronological order.
    pub fn periods(&self) -> impl Iterator<Item = RebalancePeriod> + '_ {
        self.anchors.windows(2).map(|w| RebalancePeriod {
            current: w[0],
            next: w[1],
        })
    }
}
