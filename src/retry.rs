//! Bounded retry: run an async attempt until it succeeds or the budget runs out.
//!
//! The combinator knows nothing about what is being retried; card selection
//! plugs its random pick + asset load in as the attempt body.

/// Every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: Option<E>,
}

/// Call `attempt(i)` for `i in 0..max_attempts`, returning the first success.
/// With `max_attempts == 0` nothing runs and the result is `Exhausted`.
pub async fn retry_bounded<T, E, F>(max_attempts: u32, mut attempt: F) -> Result<T, Exhausted<E>>
where
    F: AsyncFnMut(u32) -> Result<T, E>,
{
    let mut last_error = None;
    for i in 0..max_attempts {
        match attempt(i).await {
            Ok(value) => return Ok(value),
            Err(err) => last_error = Some(err),
        }
    }
    Err(Exhausted { attempts: max_attempts, last_error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn returns_first_success() {
        let mut calls = Vec::new();
        let out = block_on(retry_bounded(20, async |i| {
            calls.push(i);
            if i == 3 { Ok(i * 10) } else { Err("nope") }
        }));
        assert_eq!(out.unwrap(), 30);
        assert_eq!(calls, vec![0, 1, 2, 3]);
    }

    #[test]
    fn exhausts_after_bound() {
        let mut count = 0;
        let out: Result<(), _> = block_on(retry_bounded(5, async |i| {
            count += 1;
            Err(format!("fail {i}"))
        }));
        let exhausted = out.unwrap_err();
        assert_eq!(count, 5);
        assert_eq!(exhausted.attempts, 5);
        assert_eq!(exhausted.last_error.as_deref(), Some("fail 4"));
    }

    #[test]
    fn zero_budget_runs_nothing() {
        let out: Result<u8, Exhausted<()>> = block_on(retry_bounded(0, async |_| Ok(1)));
        assert!(out.unwrap_err().last_error.is_none());
    }
}
