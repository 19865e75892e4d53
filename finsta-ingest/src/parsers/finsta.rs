//! FINSTA03 statement parser.
//!
//! Expected document shape:
//!   <FINSTA03>
//!     <SHORTNAME>..</SHORTNAME> <S25_CISLO_UCTU>..</S25_CISLO_UCTU> ... header fields
//!     <FINSTA05> <S61_DATUM>..</S61_DATUM> <S61_CASTKA>..</S61_CASTKA> ... </FINSTA05>
//!     <FINSTA05> ... </FINSTA05>
//!   </FINSTA03>
//!
//! Anything before the root element is skipped. Only the first root is read.

use chrono::NaiveDate;
use finsta_core::{MessageFragments, Movement, Statement};
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use std::collections::HashMap;

use super::values::{parse_amount, parse_date, parse_symbol, parse_total};
use crate::error::{Location, ParseError};

pub const ROOT: &str = "FINSTA03";
pub const MOVEMENT: &str = "FINSTA05";

/// Header field tags.
pub mod header {
    pub const NAME: &str = "SHORTNAME";
    pub const ACCOUNT: &str = "S25_CISLO_UCTU";
    pub const DATE_FROM: &str = "S60_DATUM";
    pub const DATE_TO: &str = "S62_DATUM";
    pub const OPENING: &str = "S60_CASTKA";
    pub const CREDITS: &str = "SUMA_KREDIT";
    pub const DEBITS: &str = "SUMA_DEBIT";
}

/// Movement field tags.
pub mod movement {
    pub const DATE: &str = "S61_DATUM";
    pub const AMOUNT: &str = "S61_CASTKA";
    pub const ACCOUNT: &str = "PART_ACCNO";
    pub const BANK: &str = "PART_BANK_ID";
    pub const IDENTIFIER: &str = "PART_ACC_ID";
    pub const SPECIFIC_SYMBOL: &str = "S86_SPECSYMPAR";
    pub const VARIABLE_SYMBOL: &str = "S86_VARSYMPAR";

    /// Message slots in display order.
    pub const MESSAGES: [&str; finsta_core::MESSAGE_SLOTS] = [
        "PART_ID1_1",
        "PART_ID1_2",
        "PART_ID2_1",
        "PART_ID2_2",
        "PART_MSG_1",
        "PART_MSG_2",
        "REMARK",
        "PART_ACC_ID",
    ];
}

/// Child element texts of one record, keyed by tag.
#[derive(Debug, Default)]
struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    fn get(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    fn text(&self, tag: &str) -> String {
        self.get(tag).unwrap_or_default().to_string()
    }

    fn required(&self, tag: &'static str, location: Location) -> Result<&str, ParseError> {
        match self.get(tag) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ParseError::MissingField {
                field: tag,
                location,
            }),
        }
    }

    fn convert<T>(
        &self,
        tag: &'static str,
        location: Location,
        expected: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, ParseError> {
        let raw = self.required(tag, location)?;
        parse(raw).ok_or_else(|| ParseError::InvalidField {
            field: tag,
            value: raw.to_string(),
            expected,
            location,
        })
    }

    fn date(&self, tag: &'static str, location: Location) -> Result<NaiveDate, ParseError> {
        self.convert(tag, location, "date", parse_date)
    }

    fn symbol(&self, tag: &'static str, location: Location) -> Result<Option<u64>, ParseError> {
        let raw = self.get(tag).unwrap_or_default();
        parse_symbol(raw).ok_or_else(|| ParseError::InvalidField {
            field: tag,
            value: raw.to_string(),
            expected: "integer symbol",
            location,
        })
    }
}

struct RawStatement {
    header: RawRecord,
    movements: Vec<RawRecord>,
}

fn malformed(reader: &Reader<&[u8]>, message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        position: reader.buffer_position() as u64,
        message: message.into(),
    }
}

/// Collect header and movement fields in document order.
fn read_records(xml: &str) -> Result<RawStatement, ParseError> {
    let mut reader = Reader::from_str(xml);

    let mut found_root = false;
    let mut in_root = false;
    let mut header = RawRecord::default();
    let mut movements = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut field: Option<String> = None;
    // nested elements inside a field are flattened into its text
    let mut nested = 0usize;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(&reader, e.to_string()))?;

        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !in_root {
                    if name == ROOT {
                        found_root = true;
                        in_root = true;
                    }
                } else if field.is_some() {
                    nested += 1;
                } else if name == MOVEMENT && current.is_none() {
                    current = Some(RawRecord::default());
                } else {
                    field = Some(name);
                    text.clear();
                }
            }
            Event::Empty(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !in_root {
                    if name == ROOT {
                        found_root = true;
                        break;
                    }
                } else if field.is_none() {
                    if name == MOVEMENT && current.is_none() {
                        movements.push(RawRecord::default());
                    } else {
                        let target = current.as_mut().unwrap_or(&mut header);
                        target.fields.entry(name).or_default();
                    }
                }
            }
            Event::Text(ref e) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(ref e) if field.is_some() => {
                text.push('&');
                text.push_str(&String::from_utf8_lossy(e));
                text.push(';');
            }
            Event::CData(ref e) if field.is_some() => {
                let raw = String::from_utf8_lossy(e.as_ref());
                text.push_str(&escape(&*raw));
            }
            Event::End(ref e) => {
                if !in_root {
                    continue;
                }
                if nested > 0 {
                    nested -= 1;
                    continue;
                }
                let name = e.name();
                let name = name.as_ref();
                if let Some(tag) = field.take() {
                    let value = unescape(text.as_str())
                        .map_err(|err| malformed(&reader, format!("in {tag}: {err}")))?
                        .trim()
                        .to_string();
                    let target = current.as_mut().unwrap_or(&mut header);
                    target.fields.insert(tag, value);
                    text.clear();
                } else if name == MOVEMENT.as_bytes() {
                    if let Some(record) = current.take() {
                        movements.push(record);
                    }
                } else if name == ROOT.as_bytes() {
                    in_root = false;
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !found_root {
        return Err(ParseError::MissingRoot(ROOT));
    }
    if in_root {
        return Err(malformed(&reader, format!("unexpected end of document inside {ROOT}")));
    }

    Ok(RawStatement { header, movements })
}

fn build_movement(raw: &RawRecord, index: usize) -> Result<Movement, ParseError> {
    let at = Location::Movement(index);
    let date = raw.date(movement::DATE, at)?;
    let amount = raw.convert(movement::AMOUNT, at, "amount", parse_amount)?;

    Ok(Movement {
        date,
        amount,
        counter_account: raw.text(movement::ACCOUNT),
        counter_bank: raw.text(movement::BANK),
        identifier: raw.text(movement::IDENTIFIER),
        specific_symbol: raw.symbol(movement::SPECIFIC_SYMBOL, at)?,
        variable_symbol: raw.symbol(movement::VARIABLE_SYMBOL, at)?,
        messages: MessageFragments::from_slots(movement::MESSAGES.iter().map(|tag| raw.get(tag))),
    })
}

/// Parse a decoded FINSTA03 document.
pub fn parse_finsta(xml: &str) -> Result<Statement, ParseError> {
    let raw = read_records(xml)?;
    let h = &raw.header;
    let at = Location::Header;

    let movements = raw
        .movements
        .iter()
        .enumerate()
        .map(|(i, record)| build_movement(record, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Statement {
        holder: h.text(header::NAME),
        account: h.text(header::ACCOUNT),
        period_start: h.date(header::DATE_FROM, at)?,
        period_end: h.date(header::DATE_TO, at)?,
        opening_balance: h.convert(header::OPENING, at, "amount", parse_amount)?,
        credits: h.convert(header::CREDITS, at, "amount", parse_total)?,
        debits: -h.convert(header::DEBITS, at, "amount", parse_total)?,
        movements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<FINSTA>
  <FINSTA03>
    <SHORTNAME>NOVAK JAN</SHORTNAME>
    <S25_CISLO_UCTU>123456789/0300</S25_CISLO_UCTU>
    <S60_DATUM>01.03.2024</S60_DATUM>
    <S62_DATUM>31.03.2024</S62_DATUM>
    <S60_CASTKA>10000,00</S60_CASTKA>
    <SUMA_KREDIT>K=25000,00</SUMA_KREDIT>
    <SUMA_DEBIT>D=1250,50</SUMA_DEBIT>
    <FINSTA05>
      <S61_DATUM>05.03.2024</S61_DATUM>
      <S61_CASTKA>25000,00</S61_CASTKA>
      <PART_ACCNO>19-2000145399</PART_ACCNO>
      <PART_BANK_ID>0800</PART_BANK_ID>
      <S86_SPECSYMPAR></S86_SPECSYMPAR>
      <S86_VARSYMPAR>202403</S86_VARSYMPAR>
      <PART_ID1_1>ACME s.r.o.</PART_ID1_1>
      <PART_ID1_2/>
      <PART_MSG_1>Mzda 03/2024</PART_MSG_1>
    </FINSTA05>
    <FINSTA05>
      <S61_DATUM>07.03.2024</S61_DATUM>
      <S61_CASTKA>-1250,50</S61_CASTKA>
      <PART_ACCNO></PART_ACCNO>
      <PART_ID1_1></PART_ID1_1>
      <PART_MSG_1>Bread &amp; Butter</PART_MSG_1>
      <REMARK>coffee</REMARK>
      <PART_ACC_ID>CAFE MAX</PART_ACC_ID>
    </FINSTA05>
  </FINSTA03>
</FINSTA>"#;

    #[test]
    fn test_parse_header() {
        let st = parse_finsta(SAMPLE).unwrap();
        assert_eq!(st.holder, "NOVAK JAN");
        assert_eq!(st.account, "123456789/0300");
        assert_eq!(st.period_start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(st.period_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(st.opening_balance, 10000.0);
        assert_eq!(st.credits, 25000.0);
        assert_eq!(st.debits, -1250.5);
        assert_eq!(st.closing_balance(), 33749.5);
    }

    #[test]
    fn test_parse_movements_in_order() {
        let st = parse_finsta(SAMPLE).unwrap();
        assert_eq!(st.movements.len(), 2);

        let salary = &st.movements[0];
        assert_eq!(salary.amount, 25000.0);
        assert_eq!(salary.counter_account, "19-2000145399");
        assert_eq!(salary.counter_bank, "0800");
        assert_eq!(salary.specific_symbol, None);
        assert_eq!(salary.variable_symbol, Some(202403));
        assert_eq!(
            salary.messages.iter().collect::<Vec<_>>(),
            vec!["ACME s.r.o.", "Mzda 03/2024"]
        );

        let coffee = &st.movements[1];
        assert_eq!(coffee.amount, -1250.5);
        assert_eq!(coffee.identifier, "CAFE MAX");
        assert_eq!(
            coffee.messages.iter().collect::<Vec<_>>(),
            vec!["Bread & Butter", "coffee", "CAFE MAX"]
        );
        assert_eq!(coffee.description(), Some("CAFE MAX"));
    }

    #[test]
    fn test_round_trip_balances() {
        let st = parse_finsta(SAMPLE).unwrap();
        let derived = st.derived_closing_balance();
        assert!((derived - st.closing_balance()).abs() < 1e-9);
        assert_eq!(st.movement_credits(), st.credits);
        assert_eq!(st.movement_debits(), st.debits);
    }

    #[test]
    fn test_missing_root() {
        let err = parse_finsta("<FINSTA><OTHER/></FINSTA>").unwrap_err();
        assert!(matches!(err, ParseError::MissingRoot("FINSTA03")));
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let err = parse_finsta("<FINSTA03><SHORTNAME>x</S25_CISLO_UCTU></FINSTA03>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_unclosed_root_is_malformed() {
        let err = parse_finsta("<FINSTA03><SHORTNAME>x</SHORTNAME>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_bad_amount_names_movement() {
        let xml = SAMPLE.replace("-1250,50</S61_CASTKA>", "lots</S61_CASTKA>");
        let err = parse_finsta(&xml).unwrap_err();
        match err {
            ParseError::InvalidField {
                field, location, ..
            } => {
                assert_eq!(field, movement::AMOUNT);
                assert_eq!(location, Location::Movement(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_symbol_fails() {
        let xml = SAMPLE.replace("<S86_VARSYMPAR>202403", "<S86_VARSYMPAR>20x403");
        let err = parse_finsta(&xml).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidField { field: movement::VARIABLE_SYMBOL, .. }
        ));
    }

    #[test]
    fn test_missing_header_date() {
        let xml = SAMPLE.replace("<S60_DATUM>01.03.2024</S60_DATUM>", "");
        let err = parse_finsta(&xml).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField { field: header::DATE_FROM, location: Location::Header }
        ));
    }

    #[test]
    fn test_statement_without_movements() {
        let xml = r#"<FINSTA03>
            <S60_DATUM>01.03.2024</S60_DATUM><S62_DATUM>31.03.2024</S62_DATUM>
            <S60_CASTKA>5,00</S60_CASTKA><SUMA_KREDIT>0</SUMA_KREDIT><SUMA_DEBIT>0</SUMA_DEBIT>
        </FINSTA03>"#;
        let st = parse_finsta(xml).unwrap();
        assert!(st.movements.is_empty());
        assert_eq!(st.holder, "");
        assert_eq!(st.closing_balance(), 5.0);
    }
}
