use core::fmt;

/// Displays a slice of displayable items separated by `sep`.
pub(crate) fn display_separated<'a, T: fmt::Display>(
    items: &'a [T],
    sep: &'static str,
) -> impl fmt::Display + 'a {
    struct Separated<'a, T> {
        items: &'a [T],
        sep: &'static str,
    }

    impl<'a, T: fmt::Display> fmt::Display for Separated<'a, T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut delim = "";
            for item in self.items {
                f.write_str(delim)?;
                delim = self.sep;
                write!(f, "{}", item)?;
            }
            Ok(())
        }
    }

    Separated { items, sep }
}

/// Displays a slice of displayable items separated by commas.
pub(crate) fn display_comma_separated<T: fmt::Display>(items: &[T]) -> impl fmt::Display + '_ {
    display_separated(items, ", ")
}
