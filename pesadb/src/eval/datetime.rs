use chrono::{Duration, Local, NaiveDateTime, Timelike};

use pesadb_ast::expression::DateTimeFunction;
use pesadb_core::{parse_date, parse_datetime, Value};
use pesadb_engine::EngineError;

/// Evaluates a datetime function over already-evaluated, non-NULL
/// arguments (the caller handles NULL propagation and arity).
pub(crate) fn evaluate(func: DateTimeFunction, args: &[Value]) -> Result<Value, EngineError> {
    match func {
        DateTimeFunction::Now => Ok(Value::DateTime(Local::now().naive_local())),
        DateTimeFunction::CurrentDate => Ok(Value::Date(Local::now().date_naive())),
        DateTimeFunction::CurrentTime => Ok(Value::Time(Local::now().time())),

        DateTimeFunction::Date => Ok(Value::Date(as_datetime(func, &args[0])?.date())),
        DateTimeFunction::Time => Ok(Value::Time(as_datetime(func, &args[0])?.time())),

        DateTimeFunction::Year => Ok(Value::Int(i64::from(
            chrono::Datelike::year(&as_datetime(func, &args[0])?.date()),
        ))),
        DateTimeFunction::Month => Ok(Value::Int(i64::from(
            chrono::Datelike::month(&as_datetime(func, &args[0])?.date()),
        ))),
        DateTimeFunction::Day => Ok(Value::Int(i64::from(
            chrono::Datelike::day(&as_datetime(func, &args[0])?.date()),
        ))),

        DateTimeFunction::Hour => {
            Ok(Value::Int(i64::from(as_time_of_day(func, &args[0])?.hour())))
        }
        DateTimeFunction::Minute => Ok(Value::Int(i64::from(
            as_time_of_day(func, &args[0])?.minute(),
        ))),
        DateTimeFunction::Second => Ok(Value::Int(i64::from(
            as_time_of_day(func, &args[0])?.second(),
        ))),

        DateTimeFunction::DateAdd => shift_days(func, &args[0], as_days(func, &args[1])?),
        DateTimeFunction::DateSub => shift_days(func, &args[0], -as_days(func, &args[1])?),

        DateTimeFunction::DateDiff => {
            let first = as_datetime(func, &args[0])?.date();
            let second = as_datetime(func, &args[1])?.date();
            Ok(Value::Int((first - second).num_days()))
        }
    }
}

/// Widens a date, datetime or ISO string into a datetime.
fn as_datetime(func: DateTimeFunction, value: &Value) -> Result<NaiveDateTime, EngineError> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Date(date) => Ok(date.and_hms_opt(0, 0, 0).expect("midnight is valid")),
        Value::Str(text) => {
            parse_datetime(text).map_err(|_| invalid_argument(func, value))
        }
        _ => Err(invalid_argument(func, value)),
    }
}

/// Extracts a time of day, accepting TIME values directly.
fn as_time_of_day(func: DateTimeFunction, value: &Value) -> Result<chrono::NaiveTime, EngineError> {
    match value {
        Value::Time(time) => Ok(*time),
        Value::Str(text) => {
            if let Ok(time) = pesadb_core::parse_time(text) {
                return Ok(time);
            }
            Ok(as_datetime(func, value)?.time())
        }
        _ => Ok(as_datetime(func, value)?.time()),
    }
}

fn as_days(func: DateTimeFunction, value: &Value) -> Result<i64, EngineError> {
    match value {
        Value::Int(days) => Ok(*days),
        Value::Float(days) => Ok(*days as i64),
        _ => Err(EngineError::Execution(format!(
            "{}() expects a number of days, got {}",
            func,
            value.describe()
        ))),
    }
}

/// Adds days to a date-like value, keeping its shape: dates stay dates,
/// datetimes stay datetimes.
fn shift_days(func: DateTimeFunction, value: &Value, days: i64) -> Result<Value, EngineError> {
    let delta = Duration::days(days);
    match value {
        Value::Date(date) => Ok(Value::Date(*date + delta)),
        Value::DateTime(dt) => Ok(Value::DateTime(*dt + delta)),
        Value::Str(text) => {
            if let Ok(date) = parse_date(text) {
                return Ok(Value::Date(date + delta));
            }
            let dt = parse_datetime(text).map_err(|_| invalid_argument(func, value))?;
            Ok(Value::DateTime(dt + delta))
        }
        _ => Err(invalid_argument(func, value)),
    }
}

fn invalid_argument(func: DateTimeFunction, value: &Value) -> EngineError {
    EngineError::Execution(format!(
        "Invalid date/datetime value for {}(): {}",
        func,
        value.describe()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn extractors_work_on_strings_and_typed_values() {
        let dt = Value::Str("2024-03-05T14:30:15".into());
        assert_eq!(
            evaluate(DateTimeFunction::Year, &[dt.clone()]).unwrap(),
            Value::Int(2024)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Month, &[dt.clone()]).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Day, &[dt.clone()]).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Hour, &[dt.clone()]).unwrap(),
            Value::Int(14)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Minute, &[dt.clone()]).unwrap(),
            Value::Int(30)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Second, &[dt]).unwrap(),
            Value::Int(15)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Hour, &[Value::Str("09:15:00".into())]).unwrap(),
            Value::Int(9)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Year, &[date(2020, 1, 2)]).unwrap(),
            Value::Int(2020)
        );
    }

    #[test]
    fn date_and_time_split_a_datetime() {
        let dt = Value::Str("2024-03-05T14:30:15".into());
        assert_eq!(
            evaluate(DateTimeFunction::Date, &[dt.clone()]).unwrap(),
            date(2024, 3, 5)
        );
        assert_eq!(
            evaluate(DateTimeFunction::Time, &[dt]).unwrap().to_string(),
            "14:30:15"
        );
    }

    #[test]
    fn date_arithmetic_keeps_the_shape() {
        assert_eq!(
            evaluate(DateTimeFunction::DateAdd, &[date(2024, 1, 30), Value::Int(3)]).unwrap(),
            date(2024, 2, 2)
        );
        assert_eq!(
            evaluate(DateTimeFunction::DateSub, &[date(2024, 1, 2), Value::Int(3)]).unwrap(),
            date(2023, 12, 30)
        );
        assert_eq!(
            evaluate(
                DateTimeFunction::DateAdd,
                &[Value::Str("2024-01-30".into()), Value::Int(1)]
            )
            .unwrap(),
            date(2024, 1, 31)
        );
        assert_eq!(
            evaluate(
                DateTimeFunction::DateDiff,
                &[date(2024, 1, 10), date(2024, 1, 3)]
            )
            .unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn unparseable_input_is_an_error() {
        let err = evaluate(DateTimeFunction::Year, &[Value::Str("soon".into())]).unwrap_err();
        assert!(err.to_string().contains("YEAR()"));
        assert!(evaluate(DateTimeFunction::Hour, &[Value::Int(5)]).is_err());
    }
}
