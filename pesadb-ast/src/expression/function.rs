use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregate functions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AggregateFunction {
    /// `COUNT(*)` counts rows; `COUNT(expr)` counts non-NULL values.
    Count,
    /// `SUM(expr)` over non-NULL numeric values.
    Sum,
    /// `AVG(expr)` over non-NULL numeric values.
    Avg,
    /// `MIN(expr)` under the natural ordering of non-NULL values.
    Min,
    /// `MAX(expr)` under the natural ordering of non-NULL values.
    Max,
}

impl AggregateFunction {
    /// Resolves a function name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "COUNT" => Some(Self::Count),
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Avg),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        })
    }
}

/// Datetime functions.
///
/// `Now`, `CurrentDate` and `CurrentTime` read the clock; everything else
/// is a pure function of its arguments. Any argument evaluating to NULL
/// makes the call return NULL.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DateTimeFunction {
    /// `NOW()` — current datetime.
    Now,
    /// `CURRENT_DATE()` — current date.
    CurrentDate,
    /// `CURRENT_TIME()` — current time.
    CurrentTime,
    /// `DATE(dt)` — date part of a datetime.
    Date,
    /// `TIME(dt)` — time part of a datetime.
    Time,
    /// `YEAR(date)`
    Year,
    /// `MONTH(date)`
    Month,
    /// `DAY(date)`
    Day,
    /// `HOUR(time-or-dt)`
    Hour,
    /// `MINUTE(time-or-dt)`
    Minute,
    /// `SECOND(time-or-dt)`
    Second,
    /// `DATE_ADD(date, days)`
    DateAdd,
    /// `DATE_SUB(date, days)`
    DateSub,
    /// `DATEDIFF(date1, date2)` — difference in days.
    DateDiff,
}

impl DateTimeFunction {
    /// Resolves a function name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "NOW" => Some(Self::Now),
            "CURRENT_DATE" => Some(Self::CurrentDate),
            "CURRENT_TIME" => Some(Self::CurrentTime),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "YEAR" => Some(Self::Year),
            "MONTH" => Some(Self::Month),
            "DAY" => Some(Self::Day),
            "HOUR" => Some(Self::Hour),
            "MINUTE" => Some(Self::Minute),
            "SECOND" => Some(Self::Second),
            "DATE_ADD" => Some(Self::DateAdd),
            "DATE_SUB" => Some(Self::DateSub),
            "DATEDIFF" => Some(Self::DateDiff),
            _ => None,
        }
    }

    /// The number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Now | Self::CurrentDate | Self::CurrentTime => 0,
            Self::Date
            | Self::Time
            | Self::Year
            | Self::Month
            | Self::Day
            | Self::Hour
            | Self::Minute
            | Self::Second => 1,
            Self::DateAdd | Self::DateSub | Self::DateDiff => 2,
        }
    }
}

impl fmt::Display for DateTimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Now => "NOW",
            Self::CurrentDate => "CURRENT_DATE",
            Self::CurrentTime => "CURRENT_TIME",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::DateAdd => "DATE_ADD",
            Self::DateSub => "DATE_SUB",
            Self::DateDiff => "DATEDIFF",
        })
    }
}
