// For tests and setup code: parses square literals like "E4".
// Panics on malformed input, so only use it with literals.
#[macro_export]
macro_rules! square {
    ($s:expr) => {
        $s.parse::<$crate::positions::Square>()
            .expect("Invalid square literal")
    };
}

#[macro_export]
macro_rules! squares {
    ( $( $x:expr ),* ) => {
        {
            #[allow(unused_mut)]
            let mut v: Vec<$crate::positions::Square> = Vec::new();
            $(
                v.push($crate::square!($x));
            )*
            v
        }
    };
}

/// Order-insensitive comparison of square lists.
#[cfg(test)]
pub fn same_squares(a: &[crate::positions::Square], b: &[crate::positions::Square]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}
