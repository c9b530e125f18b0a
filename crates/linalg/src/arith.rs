use crate::LinalgError;

pub(crate) fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub(crate) fn lcm(a: i128, b: i128) -> Result<i128, LinalgError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .map(i128::abs)
        .ok_or(LinalgError::Overflow)
}

pub(crate) fn to_i64(x: i128) -> Result<i64, LinalgError> {
    i64::try_from(x).map_err(|_| LinalgError::Overflow)
}

/// Divide a sparse row by the gcd of its entries and make the leading entry positive.
pub(crate) fn primitive_sparse(row: Vec<(usize, i128)>) -> Result<Vec<(usize, i64)>, LinalgError> {
    let content = row.iter().fold(0, |g, &(_, x)| gcd(g, x));
    if content == 0 {
        return Ok(Vec::new());
    }
    let content = if row[0].1 < 0 { -content } else { content };
    row.into_iter()
        .map(|(c, x)| to_i64(x / content).map(|x| (c, x)))
        .collect()
}

/// Dense counterpart of [`primitive_sparse`].
pub(crate) fn primitive_dense(row: &[i128]) -> Result<Vec<i64>, LinalgError> {
    let content = row.iter().fold(0, |g, &x| gcd(g, x));
    if content == 0 {
        return Ok(vec![0; row.len()]);
    }
    let leading = row.iter().copied().find(|&x| x != 0).unwrap_or(1);
    let content = if leading < 0 { -content } else { content };
    row.iter().map(|&x| to_i64(x / content)).collect()
}

/// Divide a dense row by its content in place. The sign is left alone.
pub(crate) fn reduce_content(row: &mut [i128]) {
    let content = row.iter().fold(0, |g, &x| gcd(g, x));
    if content > 1 {
        for x in row.iter_mut() {
            *x /= content;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(gcd(12, -18), 6);
        assert_eq!(gcd(0, -7), 7);
        assert_eq!(lcm(4, -6).unwrap(), 12);
        assert_eq!(lcm(0, 5).unwrap(), 0);
    }

    #[test]
    fn test_primitive() {
        assert_eq!(
            primitive_sparse(vec![(1, -4), (3, 6)]).unwrap(),
            vec![(1, 2), (3, -3)]
        );
        assert_eq!(primitive_dense(&[0, 0, -3, 9]).unwrap(), vec![0, 0, 1, -3]);
        assert_eq!(
            to_i64(i128::from(i64::MAX) + 1),
            Err(LinalgError::Overflow)
        );
    }
}
