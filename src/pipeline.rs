//! Runs the steps in order: fetch, store (only when there is data) then notify.
//!
//! A failing step is logged and never stops the steps after it.

use std::fmt::Display;

use log::{debug, error, info};

use crate::{
    fetch::{FetchResponse, HttpFetcher},
    notification::Email,
    storage::{Database, Record},
    UserInput,
};

pub trait Fetch {
    fn fetch(&self) -> FetchResponse;
}

pub trait Store {
    fn store(&self, record: &Record) -> anyhow::Result<()>;
}

pub trait Notify {
    fn notify(&self, input: &UserInput) -> anyhow::Result<()>;
}

impl Fetch for HttpFetcher<'_> {
    fn fetch(&self) -> FetchResponse {
        HttpFetcher::fetch(self)
    }
}

impl Store for Database<'_> {
    fn store(&self, record: &Record) -> anyhow::Result<()> {
        self.insert(record)
    }
}

impl Notify for Email<'_> {
    fn notify(&self, input: &UserInput) -> anyhow::Result<()> {
        self.send(input)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepStatus {
    Done,
    Skipped,
    Failed,
}

impl Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Done => "done",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RunSummary {
    pub fetch: StepStatus,
    pub store: StepStatus,
    pub notify: StepStatus,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fetch: {}, store: {}, notify: {}",
            self.fetch, self.store, self.notify
        )
    }
}

pub fn run_steps<F, S, N>(input: &UserInput, fetcher: &F, store: &S, notifier: &N) -> RunSummary
where
    F: Fetch,
    S: Store,
    N: Notify,
{
    let response = fetcher.fetch();
    let fetch = if response.is_error() {
        StepStatus::Failed
    } else {
        StepStatus::Done
    };

    let store = match response.payload() {
        Some(payload) => match store.store(&Record::new(payload)) {
            Ok(()) => StepStatus::Done,
            Err(e) => {
                error!("Database error: {e:#}");
                StepStatus::Failed
            }
        },
        None => {
            debug!("No payload fetched ({response}), database not touched");
            StepStatus::Skipped
        }
    };

    let notify = match notifier.notify(input) {
        Ok(()) => StepStatus::Done,
        Err(e) => {
            error!("Email error: {e:#}");
            StepStatus::Failed
        }
    };

    let result = RunSummary {
        fetch,
        store,
        notify,
    };
    info!("Run completed. {result}");
    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::bail;
    use rstest::rstest;

    use super::*;

    struct FakeFetch(FetchResponse);

    impl Fetch for FakeFetch {
        fn fetch(&self) -> FetchResponse {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct FakeStore {
        fail: bool,
        received: RefCell<Vec<Record>>,
    }

    impl Store for FakeStore {
        fn store(&self, record: &Record) -> anyhow::Result<()> {
            self.received.borrow_mut().push(record.clone());
            if self.fail {
                bail!("database is down");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotify {
        fail: bool,
        received: RefCell<Vec<UserInput>>,
    }

    impl Notify for FakeNotify {
        fn notify(&self, input: &UserInput) -> anyhow::Result<()> {
            self.received.borrow_mut().push(input.clone());
            if self.fail {
                bail!("smtp is down");
            }
            Ok(())
        }
    }

    #[test]
    fn payload_is_stored_with_tag() {
        // Arrange
        let fetcher = FakeFetch(FetchResponse::Body("hello".to_string()));
        let store = FakeStore::default();
        let notifier = FakeNotify::default();

        // Act
        let actual = run_steps(&UserInput::from("Bob"), &fetcher, &store, &notifier);

        // Assert
        assert_eq!(
            actual,
            RunSummary {
                fetch: StepStatus::Done,
                store: StepStatus::Done,
                notify: StepStatus::Done,
            }
        );
        let stored = store.received.borrow();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].params(), ["hello", "Another Value"]);
        assert_eq!(*notifier.received.borrow(), vec![UserInput::from("Bob")]);
    }

    #[rstest]
    #[case(FetchResponse::Empty, StepStatus::Done)]
    #[case(FetchResponse::Timeout, StepStatus::Failed)]
    #[case(FetchResponse::ErrorTransport { msg: "refused".into() }, StepStatus::Failed)]
    #[case(FetchResponse::ErrorHttp { status: 500, msg: "Internal Server Error".into() }, StepStatus::Failed)]
    #[case(FetchResponse::ErrorDecode { msg: "bad utf-8".into() }, StepStatus::Failed)]
    fn no_payload_skips_store_but_notifies(
        #[case] response: FetchResponse,
        #[case] expected_fetch: StepStatus,
    ) {
        // Arrange
        let fetcher = FakeFetch(response);
        let store = FakeStore::default();
        let notifier = FakeNotify::default();

        // Act
        let actual = run_steps(&UserInput::from("Bob"), &fetcher, &store, &notifier);

        // Assert
        assert_eq!(actual.fetch, expected_fetch);
        assert_eq!(actual.store, StepStatus::Skipped);
        assert_eq!(actual.notify, StepStatus::Done);
        assert!(store.received.borrow().is_empty());
        assert_eq!(notifier.received.borrow().len(), 1);
    }

    #[test]
    fn database_failure_still_notifies() {
        // Arrange
        let fetcher = FakeFetch(FetchResponse::Body("hello".to_string()));
        let store = FakeStore {
            fail: true,
            ..Default::default()
        };
        let notifier = FakeNotify::default();

        // Act
        let actual = run_steps(&UserInput::from("Bob"), &fetcher, &store, &notifier);

        // Assert
        assert_eq!(actual.store, StepStatus::Failed);
        assert_eq!(actual.notify, StepStatus::Done);
        assert_eq!(notifier.received.borrow().len(), 1);
    }

    #[test]
    fn every_step_failing_still_completes() {
        // Arrange
        let fetcher = FakeFetch(FetchResponse::Timeout);
        let store = FakeStore {
            fail: true,
            ..Default::default()
        };
        let notifier = FakeNotify {
            fail: true,
            ..Default::default()
        };

        // Act
        let actual = run_steps(&UserInput::from("Bob"), &fetcher, &store, &notifier);

        // Assert
        assert_eq!(
            actual,
            RunSummary {
                fetch: StepStatus::Failed,
                store: StepStatus::Skipped,
                notify: StepStatus::Failed,
            }
        );
    }

    #[test]
    fn summary_display() {
        let summary = RunSummary {
            fetch: StepStatus::Done,
            store: StepStatus::Skipped,
            notify: StepStatus::Failed,
        };
        assert_eq!(
            summary.to_string(),
            "fetch: done, store: skipped, notify: failed"
        );
    }
}
