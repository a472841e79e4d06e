use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        assert_eq!(split_csv(" smoke, ,full-trip "), vec!["smoke", "full-trip"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn seeds_must_be_numbers() {
        assert_eq!(parse_seeds("1, 42").unwrap(), vec![1, 42]);
        assert!(parse_seeds("1,abc").is_err());
    }
}
