//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

pub mod clock {
    //! Clock doubles.

    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    ///
    /// use chrono::{TimeZone, Utc};
    /// use mockable::Clock;
    /// use rocktags::test_support::clock::MutableClock;
    ///
    /// let start = Utc.with_ymd_and_hms(2025, 9, 18, 16, 0, 0).single().expect("valid");
    /// let clock = MutableClock::new(start);
    /// clock.advance(Duration::from_secs(5));
    /// assert_eq!((clock.utc() - start).num_seconds(), 5);
    /// ```
    #[derive(Debug)]
    pub struct MutableClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl MutableClock {
        /// Start the clock at `now`.
        pub const fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        /// Move the clock forward. Durations beyond [`TimeDelta`] range
        /// saturate.
        pub fn advance(&self, by: Duration) {
            let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now = now.checked_add_signed(delta).unwrap_or(*now);
        }

        /// Move the clock forward by whole seconds.
        pub fn advance_seconds(&self, seconds: u64) {
            self.advance(Duration::from_secs(seconds));
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

pub mod sleep {
    //! Retry sleeper doubles.

    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::RetrySleeper;

    /// Records each requested delay and returns immediately.
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        /// Delays requested so far, in order.
        #[must_use]
        pub fn recorded(&self) -> Vec<Duration> {
            self.delays
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl RetrySleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(duration);
        }
    }
}

pub mod cap_fs {
    //! Capability-safe file helpers for tests.
    //!
    //! The backend avoids `std::fs`; these helpers go through
    //! `cap_std::fs::Dir`.

    use std::io;
    use std::path::{Path, PathBuf};

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rocktags::test_support::cap_fs::write_file;
    ///
    /// let path = std::env::temp_dir().join("rocktags-cap-fs-example.txt");
    /// write_file(&path, b"cat1=abc\n")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path must include a file name")
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(file_name), contents)
    }

    /// Write `contents` to `name` inside a fresh temporary directory.
    ///
    /// The directory is removed when the returned guard drops.
    pub fn temp_file(name: &str, contents: &[u8]) -> io::Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(name);
        write_file(&path, contents)?;
        Ok((dir, path))
    }
}
