//! Digitized chart rows in comma-separated form.

/// Parses newline-delimited rows of comma-separated numbers.
///
/// Blank lines and lines containing any non-numeric field (such as a header,
/// or a `nan` or `inf` placeholder) are skipped. Width is not checked here.
pub(super) fn parse_rows(text: &str) -> Vec<Vec<f64>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            line.split(',')
                .map(|field| field.trim().parse::<f64>().ok().filter(|x| x.is_finite()))
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_headers_and_blank_lines() {
        let text = "weight_lb,pressure_alt_ft,oat_c,value\n\
                    6000,0,-20,2100\n\
                    \n\
                    6000, 0, 3.1128, 2250 \r\n\
                    6000,0,ISA,9\n";

        let rows = parse_rows(text);
        assert_eq!(
            rows,
            vec![
                vec![6000.0, 0.0, -20.0, 2100.0],
                vec![6000.0, 0.0, 3.1128, 2250.0],
            ]
        );
    }

    #[test]
    fn skips_non_finite_placeholders() {
        let text = "4500,0,1500\n4500,nan,1600\n6000,0,inf\n6000,0,-Infinity\n6000,0,2100\n";
        assert_eq!(
            parse_rows(text),
            vec![vec![4500.0, 0.0, 1500.0], vec![6000.0, 0.0, 2100.0]]
        );
    }

    #[test]
    fn empty_input() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("\n\n").is_empty());
    }
}
