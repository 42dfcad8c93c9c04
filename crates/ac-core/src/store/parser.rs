use nom::{
    bytes::complete::take_while,
    character::complete::{char, line_ending},
    combinator::opt,
    multi::separated_list1,
    IResult,
};
use thiserror::Error;

use super::models::{GroupRecord, PasswdRecord, ShadowRecord, StoreKind};

/// Errors raised while decoding one of the three store files.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{kind} store line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        kind: StoreKind,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{kind} store line {line}: {field} field is not numeric: {value:?}")]
    Numeric {
        kind: StoreKind,
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("{kind} store line {line}: unparseable record")]
    Garbled { kind: StoreKind, line: usize },
}

// nom parsers

fn field(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != ':' && c != '\n' && c != '\r')(input)
}

/// One record line: two or more colon-separated fields, optionally
/// terminated by a line ending. Requiring the first separator keeps the
/// outer loop from accepting blank or colon-free lines.
fn record_line(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, first) = field(input)?;
    let (input, _) = char(':')(input)?;
    let (input, mut rest) = separated_list1(char(':'), field)(input)?;
    let (input, _) = opt(line_ending)(input)?;
    let mut fields = vec![first];
    fields.append(&mut rest);
    Ok((input, fields))
}

/// Split a whole store file into per-line field slices, failing on the
/// first line that does not scan.
fn split_lines(kind: StoreKind, input: &str) -> Result<Vec<Vec<&str>>, RecordError> {
    let mut rows = Vec::new();
    let mut remaining = input;
    while !remaining.is_empty() {
        match record_line(remaining) {
            Ok((rest, fields)) => {
                rows.push(fields);
                remaining = rest;
            }
            Err(_) => {
                return Err(RecordError::Garbled {
                    kind,
                    line: rows.len() + 1,
                })
            }
        }
    }
    Ok(rows)
}

fn check_count(kind: StoreKind, line: usize, found: usize) -> Result<(), RecordError> {
    let expected = kind.field_count();
    if found != expected {
        return Err(RecordError::FieldCount {
            kind,
            line,
            expected,
            found,
        });
    }
    Ok(())
}

/// Parse an optional day counter. The empty field and the negative
/// out-of-range sentinel both decode to `None`, so a sentinel read from
/// disk serializes back out as an empty field.
fn day_field(
    kind: StoreKind,
    line: usize,
    field: &'static str,
    raw: &str,
) -> Result<Option<i64>, RecordError> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(days) if days < 0 => Ok(None),
        Ok(days) => Ok(Some(days)),
        Err(_) => Err(RecordError::Numeric {
            kind,
            line,
            field,
            value: raw.to_string(),
        }),
    }
}

fn id_field(
    kind: StoreKind,
    line: usize,
    field: &'static str,
    raw: &str,
) -> Result<u32, RecordError> {
    raw.parse().map_err(|_| RecordError::Numeric {
        kind,
        line,
        field,
        value: raw.to_string(),
    })
}

pub fn parse_shadow(input: &str) -> Result<Vec<ShadowRecord>, RecordError> {
    const KIND: StoreKind = StoreKind::Shadow;
    let mut records = Vec::new();
    for (idx, fields) in split_lines(KIND, input)?.into_iter().enumerate() {
        let line = idx + 1;
        check_count(KIND, line, fields.len())?;
        records.push(ShadowRecord {
            name: fields[0].to_string(),
            hash: fields[1].to_string(),
            last_change: day_field(KIND, line, "lastchange", fields[2])?,
            min_days: day_field(KIND, line, "min", fields[3])?,
            max_days: day_field(KIND, line, "max", fields[4])?,
            warn_days: day_field(KIND, line, "warn", fields[5])?,
            inactive_days: day_field(KIND, line, "inactive", fields[6])?,
            expire_day: day_field(KIND, line, "expire", fields[7])?,
        });
    }
    Ok(records)
}

pub fn parse_passwd(input: &str) -> Result<Vec<PasswdRecord>, RecordError> {
    const KIND: StoreKind = StoreKind::Passwd;
    let mut records = Vec::new();
    for (idx, fields) in split_lines(KIND, input)?.into_iter().enumerate() {
        let line = idx + 1;
        check_count(KIND, line, fields.len())?;
        records.push(PasswdRecord {
            name: fields[0].to_string(),
            password: fields[1].to_string(),
            uid: id_field(KIND, line, "uid", fields[2])?,
            gid: id_field(KIND, line, "gid", fields[3])?,
            gecos: fields[4].to_string(),
            home: fields[5].to_string(),
            shell: fields[6].to_string(),
        });
    }
    Ok(records)
}

pub fn parse_group(input: &str) -> Result<Vec<GroupRecord>, RecordError> {
    const KIND: StoreKind = StoreKind::Group;
    let mut records = Vec::new();
    for (idx, fields) in split_lines(KIND, input)?.into_iter().enumerate() {
        let line = idx + 1;
        check_count(KIND, line, fields.len())?;
        records.push(GroupRecord {
            name: fields[0].to_string(),
            password: fields[1].to_string(),
            gid: id_field(KIND, line, "gid", fields[2])?,
            members: fields[3].to_string(),
        });
    }
    Ok(records)
}

pub fn serialize_shadow(records: &[ShadowRecord]) -> String {
    records.iter().map(ShadowRecord::to_line).collect()
}

pub fn serialize_passwd(records: &[PasswdRecord]) -> String {
    records.iter().map(PasswdRecord::to_line).collect()
}

pub fn serialize_group(records: &[GroupRecord]) -> String {
    records.iter().map(GroupRecord::to_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_roundtrip() {
        let input = "\
root:*:19000:0:99999:7::
alice:$6$salt$digest:19000:0:99999:7::
bin:*:18000:0:99999:7::
";
        let records = parse_shadow(input).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].name, "alice");
        assert_eq!(records[1].hash, "$6$salt$digest");
        assert_eq!(records[1].max_days, Some(99999));
        assert_eq!(records[1].inactive_days, None);
        assert_eq!(serialize_shadow(&records), input);
    }

    #[test]
    fn test_shadow_sentinel_normalizes_to_empty() {
        let input = "alice:x:-1:0:99999:7:-1:\n";
        let records = parse_shadow(input).unwrap();
        assert_eq!(records[0].last_change, None);
        assert_eq!(records[0].inactive_days, None);
        assert_eq!(serialize_shadow(&records), "alice:x::0:99999:7::\n");
    }

    #[test]
    fn test_shadow_missing_trailing_newline_gains_one() {
        let input = "alice:x:19000:0:99999:7::";
        let records = parse_shadow(input).unwrap();
        assert_eq!(serialize_shadow(&records), format!("{input}\n"));
    }

    #[test]
    fn test_shadow_field_count_mismatch() {
        let input = "alice:x:19000:0:99999:7:\n";
        match parse_shadow(input) {
            Err(RecordError::FieldCount {
                kind: StoreKind::Shadow,
                line: 1,
                expected: 8,
                found: 7,
            }) => {}
            other => panic!("expected field count error, got {other:?}"),
        }
    }

    #[test]
    fn test_garbled_line_reports_position() {
        let input = "alice:x:19000:0:99999:7::\nnot a record\n";
        match parse_shadow(input) {
            Err(RecordError::Garbled { line: 2, .. }) => {}
            other => panic!("expected garbled error, got {other:?}"),
        }
    }

    #[test]
    fn test_passwd_roundtrip() {
        let input = "\
root:x:0:0:root:/root:/bin/bash
alice:x:1000:1000:Alice:/home/alice:/bin/bash
";
        let records = parse_passwd(input).unwrap();
        assert_eq!(records[1].uid, 1000);
        assert_eq!(records[1].home, "/home/alice");
        assert_eq!(serialize_passwd(&records), input);
    }

    #[test]
    fn test_passwd_rejects_non_numeric_uid() {
        let input = "alice:x:abc:1000:Alice:/home/alice:/bin/bash\n";
        match parse_passwd(input) {
            Err(RecordError::Numeric { field: "uid", .. }) => {}
            other => panic!("expected numeric error, got {other:?}"),
        }
    }

    #[test]
    fn test_group_roundtrip_empty_members() {
        let input = "\
wheel:x:10:
users:x:100:alice,bob
";
        let records = parse_group(input).unwrap();
        assert_eq!(records[0].members, "");
        assert_eq!(records[1].members, "alice,bob");
        assert_eq!(serialize_group(&records), input);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_shadow("").unwrap().is_empty());
        assert!(parse_passwd("").unwrap().is_empty());
        assert!(parse_group("").unwrap().is_empty());
    }

    #[test]
    fn test_gecos_preserves_inner_punctuation() {
        let input = "alice:x:1000:1000:Alice Liddell,Room 101:/home/alice:/bin/bash\n";
        let records = parse_passwd(input).unwrap();
        assert_eq!(records[0].gecos, "Alice Liddell,Room 101");
        assert_eq!(serialize_passwd(&records), input);
    }
}
