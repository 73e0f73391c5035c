//! Reading trajectory files and writing a clustering result.

use std::io::BufRead;

use pathlets_core::{Id, TrajectoryStore};
use pathlets_distances::Point2;

/// Reads the `x y id` format: one point per line, in any order.
///
/// # Errors
///
/// If a line cannot be parsed as `f64 f64 u32`.
pub fn read_trajectory_from_file<R: BufRead>(reader: R) -> Result<TrajectoryStore<Point2>, String> {
    let mut store = TrajectoryStore::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("line {}: {e}", line_no + 1))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [x, y, id] = fields[..] else {
            return Err(format!("line {}: expected 'x y id', got '{line}'", line_no + 1));
        };
        let x: f64 = x.parse().map_err(|_| format!("line {}: bad x '{x}'", line_no + 1))?;
        let y: f64 = y.parse().map_err(|_| format!("line {}: bad y '{y}'", line_no + 1))?;
        let id: u32 = id.parse().map_err(|_| format!("line {}: bad id '{id}'", line_no + 1))?;
        store.push(Point2::new(x, y), Id(id));
    }
    Ok(store)
}

/// Reads the `id t x y` format: one point per line, ordered by id then `t`
/// within each id.
///
/// # Errors
///
/// If a line cannot be parsed as `u32 f64 f64 f64`, if `t` does not strictly
/// increase within a block, or if `id` does not increase by exactly 1 across
/// blocks (ids must start at 0).
pub fn read_trajectory_with_timestamps_from_file<R: BufRead>(reader: R) -> Result<TrajectoryStore<Point2>, String> {
    let mut store = TrajectoryStore::new();
    let mut prev_id: Option<u32> = None;
    let mut prev_t = f64::NEG_INFINITY;

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|e| format!("line {line_no}: {e}"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [id, t, x, y] = fields[..] else {
            return Err(format!("line {line_no}: expected 'id t x y', got '{line}'"));
        };
        let id: u32 = id.parse().map_err(|_| format!("line {line_no}: bad id '{id}'"))?;
        let t: f64 = t.parse().map_err(|_| format!("line {line_no}: bad t '{t}'"))?;
        let x: f64 = x.parse().map_err(|_| format!("line {line_no}: bad x '{x}'"))?;
        let y: f64 = y.parse().map_err(|_| format!("line {line_no}: bad y '{y}'"))?;

        match prev_id {
            None if id != 0 => return Err(format!("line {line_no}: first trajectory id must be 0, got {id}")),
            Some(prev) if id == prev => {
                if t <= prev_t {
                    return Err(format!("line {line_no}: timestamp {t} did not increase past {prev_t}"));
                }
            }
            Some(prev) if id == prev + 1 => {}
            Some(prev) => return Err(format!("line {line_no}: id jumped from {prev} to {id}")),
            None => {}
        }

        store.push(Point2::new(x, y), Id(id));
        prev_id = Some(id);
        prev_t = t;
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::{read_trajectory_from_file, read_trajectory_with_timestamps_from_file};
    use std::io::Cursor;

    #[test]
    fn reads_plain_xy_id_format() {
        let data = "0.0 0.0 0\n1.0 0.0 0\n0.0 0.0 1\n";
        let store = read_trajectory_from_file(Cursor::new(data)).unwrap();
        assert_eq!(store.total_len(), 3);
    }

    #[test]
    fn reads_timestamped_format() {
        let data = "0 0.0 0.0 0.0\n0 1.0 1.0 0.0\n1 0.0 0.0 1.0\n";
        let store = read_trajectory_with_timestamps_from_file(Cursor::new(data)).unwrap();
        assert_eq!(store.total_len(), 3);
    }

    #[test]
    fn rejects_non_increasing_timestamp() {
        let data = "0 1.0 0.0 0.0\n0 1.0 1.0 0.0\n";
        assert!(read_trajectory_with_timestamps_from_file(Cursor::new(data)).is_err());
    }

    #[test]
    fn rejects_id_skip() {
        let data = "0 0.0 0.0 0.0\n2 0.0 1.0 0.0\n";
        assert!(read_trajectory_with_timestamps_from_file(Cursor::new(data)).is_err());
    }
}
