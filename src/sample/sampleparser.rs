use crate::error::modelerror::ModelError;
use crate::sample::sampletable::SampleTable;

/// 以空白或逗號分隔的數值文字。
pub fn parse_samples(text: &str) -> Result<Vec<f64>, ModelError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let v: f64 = token
                .parse()
                .map_err(|_| ModelError::InvalidSample(token.to_owned()))?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(ModelError::InvalidSample(token.to_owned()))
            }
        })
        .collect()
}

/// 以 `[` 開頭視為 `[[value, count], ...]` JSON，否則視為原始數值文字。
pub fn parse_table(text: &str) -> Result<SampleTable, ModelError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        SampleTable::from_json(trimmed)
    } else {
        SampleTable::from_samples(&parse_samples(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        let samples = parse_samples("1, 2.5\n3\t-4e2,,\r\n 5 ").unwrap();
        assert_eq!(samples, vec![1.0, 2.5, 3.0, -400.0, 5.0]);
        assert!(parse_samples("").unwrap().is_empty());
        assert!(parse_samples(" , \n").unwrap().is_empty());
    }

    #[test]
    fn reports_offending_token() {
        match parse_samples("1 2 abc 4") {
            Err(ModelError::InvalidSample(token)) => assert_eq!(token, "abc"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(parse_samples("1 NaN"), Err(ModelError::InvalidSample(_))));
        assert!(matches!(parse_samples("inf"), Err(ModelError::InvalidSample(_))));
    }

    #[test]
    fn table_from_raw_text() {
        let table = parse_table("3 1 2 3").unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(1.0, 1), (2.0, 1), (3.0, 2)]);
    }

    #[test]
    fn table_from_json() {
        let table = parse_table("  [[1.0,1],[3.5,2]]\n").unwrap();
        assert_eq!(table.total(), 3);
        assert!(parse_table("[[2.0,1],[1.0,1]]").is_err());
        assert!(parse_table("[").is_err());
    }
}
