use super::{Event, Time, Voltage};
use std::{
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};

pub(crate) trait SavablePoint {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error>;
}

/// A sample of a reduced trace, written in the same layout the loader reads.
impl SavablePoint for (Time, Voltage) {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{0}\t{1}", self.0, self.1)
    }
}

impl SavablePoint for Event {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{0}", self)
    }
}

impl<T: SavablePoint> SavablePoint for &T {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        (*self).write_to(writer)
    }
}

pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    /// Returns the number of items written.
    fn save_to_writer<W: Write>(self, writer: &mut W) -> Result<usize, Error>;

    fn save_to_file(self, path: &Path) -> Result<usize, Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_writer<W: Write>(self, writer: &mut W) -> Result<usize, Error> {
        let mut count = 0;
        for item in self {
            item.write_to(writer)?;
            count += 1;
        }
        writer.flush()?;
        Ok(count)
    }

    fn save_to_file(self, path: &Path) -> Result<usize, Error> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_to_writer(&mut file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_tab_separated() {
        let mut buffer = Vec::<u8>::new();
        let count = [(0.5, 4.25), (0.75, 3.0)]
            .into_iter()
            .save_to_writer(&mut buffer)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(buffer).unwrap(), "0.5\t4.25\n0.75\t3\n");
    }

    #[test]
    fn events_are_comma_separated() {
        let events = [
            Event {
                start: 1,
                end: 3,
                start_time: 1.0,
                end_time: 1.5,
            },
            Event {
                start: 7,
                end: 9,
                start_time: 4.0,
                end_time: 6.0,
            },
        ];
        let mut buffer = Vec::<u8>::new();
        let count = events.iter().save_to_writer(&mut buffer).unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(buffer).unwrap(), "1,1.5,0.5\n4,6,2\n");
    }

    #[test]
    fn nothing_to_save() {
        let mut buffer = Vec::<u8>::new();
        let count = std::iter::empty::<Event>()
            .save_to_writer(&mut buffer)
            .unwrap();
        assert_eq!(count, 0);
        assert!(buffer.is_empty());
    }
}
