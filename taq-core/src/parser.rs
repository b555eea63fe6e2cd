use crate::constants::{FIELD_DELIMITER, NANOS_PER_SECOND, TIMESTAMP_LEN};
use crate::error::{FieldError, ParseError};
use crate::types::{Field, Quote};

/// Разбирает одну TAQ-строку вида:
/// "093000000000000|Q|IBM|100.25|200|100.30|150|..."
///
/// Порядок полей: Time|Exchange|Symbol|Bid_Price|Bid_Size|Offer_Price|Offer_Size.
/// Поля после седьмого игнорируются. При первой же ошибке возвращается
/// [`ParseError`] с номером и полным текстом строки.
pub fn parse_taq_line(line_number: u64, line: &str) -> Result<Quote, ParseError> {
    parse_fields(line).map_err(|source| ParseError {
        line_number,
        line: line.to_string(),
        source,
    })
}

fn parse_fields(line: &str) -> Result<Quote, FieldError> {
    let mut tokens = Tokens::new(line);

    let timestamp_ns = parse_timestamp(tokens.next_field(Field::Timestamp)?)?;

    // биржа не нужна
    tokens.next_field(Field::Exchange)?;

    let ticker = tokens.next_field(Field::Symbol)?.to_string();
    let bid_px = parse_price(Field::BidPrice, tokens.next_field(Field::BidPrice)?)?;
    let bid_qty = parse_qty(Field::BidSize, tokens.next_field(Field::BidSize)?)?;
    let offer_px = parse_price(Field::OfferPrice, tokens.next_field(Field::OfferPrice)?)?;
    let offer_qty = parse_qty(Field::OfferSize, tokens.next_field(Field::OfferSize)?)?;

    Ok(Quote {
        timestamp_ns,
        ticker,
        bid_px,
        bid_qty,
        offer_px,
        offer_qty,
    })
}

/// Последовательное чтение токенов до `|` или конца строки.
///
/// Токен считается отсутствующим, когда остаток строки исчерпан, в том числе
/// после завершающего `|`. Пустой токен между двумя `|` присутствует.
struct Tokens<'a> {
    rest: Option<&'a str>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: Some(line) }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let rest = self.rest.take().filter(|r| !r.is_empty())?;
        match rest.split_once(FIELD_DELIMITER) {
            Some((token, tail)) => {
                self.rest = Some(tail);
                Some(token)
            }
            None => Some(rest),
        }
    }

    fn next_field(&mut self, field: Field) -> Result<&'a str, FieldError> {
        self.next_token().ok_or(FieldError::MissingField(field))
    }
}

/// HHMMSSNNNNNNNNN -> наносекунды от полуночи.
/// Диапазоны (hh < 24 и т.п.) намеренно не проверяются.
fn parse_timestamp(token: &str) -> Result<u64, FieldError> {
    if token.len() != TIMESTAMP_LEN {
        return Err(FieldError::MalformedTimestamp {
            token: token.to_string(),
        });
    }
    // 15 байт, но не ASCII: срезы ниже могут попасть внутрь символа
    if !token.is_ascii() {
        return Err(FieldError::NotDigits {
            field: Field::Timestamp,
            token: token.to_string(),
        });
    }

    let hh = parse_digits(Field::Hours, &token[0..2])?;
    let mm = parse_digits(Field::Minutes, &token[2..4])?;
    let ss = parse_digits(Field::Seconds, &token[4..6])?;
    let nnn = parse_digits(Field::Nanos, &token[6..])?;

    Ok(((hh * 60 + mm) * 60 + ss) * NANOS_PER_SECOND + nnn)
}

fn parse_digits(field: Field, token: &str) -> Result<u64, FieldError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::NotDigits {
            field,
            token: token.to_string(),
        });
    }
    token.parse().map_err(|source| FieldError::InvalidInteger {
        field,
        token: token.to_string(),
        source,
    })
}

fn parse_price(field: Field, token: &str) -> Result<f64, FieldError> {
    token.parse().map_err(|source| FieldError::InvalidFloat {
        field,
        token: token.to_string(),
        source,
    })
}

fn parse_qty(field: Field, token: &str) -> Result<i64, FieldError> {
    token.parse().map_err(|source| FieldError::InvalidInteger {
        field,
        token: token.to_string(),
        source,
    })
}
