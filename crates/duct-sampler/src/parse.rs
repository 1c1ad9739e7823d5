//! Parsing shared by both platform backends: the `ps` output line format is
//! identical modulo the tool invocation that produces it.

use duct_core::types::{ProcessStat, StateCounter};

/// Split `line` into `n` whitespace-delimited fields, where the last field
/// keeps any remaining whitespace runs intact (mirrors Python's
/// `str.split(maxsplit=n-1)`, needed since `cmd`/`args` may contain spaces).
pub fn split_fields(line: &str, n: usize) -> Option<Vec<&str>> {
    assert!(n > 0);
    let mut rest = line;
    let mut fields = Vec::with_capacity(n);
    for _ in 0..n - 1 {
        let trimmed = rest.trim_start();
        let idx = trimmed.find(char::is_whitespace)?;
        fields.push(&trimmed[..idx]);
        rest = &trimmed[idx..];
    }
    let last = rest.trim_start();
    if last.is_empty() {
        return None;
    }
    fields.push(last);
    Some(fields)
}

/// Parse one `ps -o pid,pcpu,pmem,rss,vsz,etime,stat,cmd` (or `args`) line
/// into a [`ProcessStat`]. `rss`/`vsz` are reported by `ps` in KiB; this
/// converts them to bytes.
pub fn parse_ps_line(line: &str, timestamp: &str) -> Option<ProcessStat> {
    let fields = split_fields(line, 8)?;
    let [pid, pcpu, pmem, rss_kib, vsz_kib, etime, stat, cmd] = fields.try_into().ok()?;

    Some(ProcessStat {
        pid: pid.parse().ok()?,
        pcpu: pcpu.parse().ok()?,
        pmem: pmem.parse().ok()?,
        rss: rss_kib.parse::<u64>().ok()? * 1024,
        vsz: vsz_kib.parse::<u64>().ok()? * 1024,
        timestamp: timestamp.to_string(),
        etime: etime.to_string(),
        stat: StateCounter::single(stat),
        cmd: cmd.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_preserving_internal_whitespace_in_last_field() {
        let line = "123  1.0  2.0  4096  8192  00:01  S  python -m my mod --flag";
        let fields = split_fields(line, 8).unwrap();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0], "123");
        assert_eq!(fields[7], "python -m my mod --flag");
    }

    #[test]
    fn parses_a_realistic_ps_line_converting_kib_to_bytes() {
        let line = "42   0.5  1.2  4096   16384  00:00:05 S    sleep 5";
        let stat = parse_ps_line(line, "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(stat.pid, 42);
        assert_eq!(stat.rss, 4096 * 1024);
        assert_eq!(stat.vsz, 16384 * 1024);
        assert_eq!(stat.cmd, "sleep 5");
        assert_eq!(stat.etime, "00:00:05");
    }

    #[test]
    fn rejects_a_line_with_too_few_fields() {
        assert!(parse_ps_line("42 0.5 1.2", "t").is_none());
    }
}
