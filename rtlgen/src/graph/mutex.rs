use super::module::*;
use super::signal::*;
use super::width::*;

use crate::error::Error;

use std::cell::Cell;
use std::fmt;

/// Arbitration policy of a [`Mutex`](./struct.Mutex.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arbitration {
    /// A rotating counter picks which requester may be granted
    RoundRobin,
    /// Static priority; the highest requester index wins
    Priority,
}

impl Default for Arbitration {
    fn default() -> Self {
        Arbitration::RoundRobin
    }
}

impl fmt::Display for Arbitration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arbitration::RoundRobin => "round_robin",
            Arbitration::Priority => "priority",
        })
    }
}

/// A hardware mutex arbitrating between several requesters, created by the [`Module`]::[`mutex`] method.
///
/// Creating a `Mutex` declares one 1-bit request input (`<name>_req_<i>`) and one 1-bit grant output (`<name>_grant_<i>`) per requester. The arbitration logic itself is added by exactly one call to [`generate_round_robin`] or [`generate_priority`].
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// # fn main() -> Result<(), Error> {
/// let c = Context::new();
///
/// let m = c.module("Arbiter");
/// let arb = m.mutex("priority_arb", 3, Arbitration::Priority);
/// arb.generate_priority()?;
///
/// assert_eq!(
///     m.assigns(),
///     vec![
///         "assign priority_arb_grant_2 = priority_arb_req_2;",
///         "assign priority_arb_grant_1 = priority_arb_req_1 && !(priority_arb_req_2);",
///         "assign priority_arb_grant_0 = priority_arb_req_0 && !(priority_arb_req_1 || priority_arb_req_2);",
///     ]
/// );
/// # Ok(())
/// # }
/// ```
///
/// [`generate_priority`]: #method.generate_priority
/// [`generate_round_robin`]: #method.generate_round_robin
/// [`Module`]: ./struct.Module.html
/// [`mutex`]: ./struct.Module.html#method.mutex
#[must_use]
pub struct Mutex<'a> {
    module: &'a Module<'a>,

    pub(crate) name: String,
    pub(crate) arbitration: Arbitration,
    pub(crate) requests: Vec<&'a Signal<'a>>,
    pub(crate) grants: Vec<&'a Signal<'a>>,

    generated: Cell<bool>,
}

impl<'a> Mutex<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arbitration(&self) -> Arbitration {
        self.arbitration
    }

    pub fn requests(&self) -> &[&'a Signal<'a>] {
        &self.requests
    }

    pub fn grants(&self) -> &[&'a Signal<'a>] {
        &self.grants
    }

    fn claim(&self) -> Result<(), Error> {
        if self.generated.replace(true) {
            return Err(Error::ArbiterAlreadyGenerated {
                mutex: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Adds round-robin arbitration logic clocked by `clock`.
    ///
    /// Declares a counter register (`<name>_counter`) wide enough to index every requester, and one clocked block in which grant `i` is registered as `counter == i && request[i]`. The counter advances to `(counter + 1) % N` only in cycles where one of those grant conditions holds, so an idle cycle doesn't rotate priority. The grant outputs become registered outputs.
    ///
    /// Requests that arrive while the counter points elsewhere wait for the counter, which only moves on a grant; this arbiter can therefore stall a requester indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArbiterAlreadyGenerated`] if arbitration logic was already added to this `Mutex`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// # fn main() -> Result<(), Error> {
    /// let c = Context::new();
    ///
    /// let m = c.module("Arbiter");
    /// let clk = m.input("clk", 1);
    /// let arb = m.mutex("rr", 2, Arbitration::RoundRobin);
    /// arb.generate_round_robin(clk)?;
    ///
    /// assert_eq!(
    ///     m.always_blocks(),
    ///     vec![[
    ///         "always @(posedge clk) begin",
    ///         "  rr_grant_0 <= (rr_counter == 0) && rr_req_0;",
    ///         "  rr_grant_1 <= (rr_counter == 1) && rr_req_1;",
    ///         "  if (((rr_counter == 0) && rr_req_0) || ((rr_counter == 1) && rr_req_1)) rr_counter <= (rr_counter + 1) % 2;",
    ///         "end",
    ///     ]
    ///     .join("\n")]
    /// );
    ///
    /// assert!(arb.generate_round_robin(clk).is_err());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// [`Error::ArbiterAlreadyGenerated`]: ./error/enum.Error.html#variant.ArbiterAlreadyGenerated
    pub fn generate_round_robin(&self, clock: &Signal<'a>) -> Result<(), Error> {
        self.claim()?;
        let requesters = self.requests.len();
        if requesters == 0 {
            return Ok(());
        }

        let counter = self
            .module
            .reg(format!("{}_counter", self.name), width_of(requesters - 1));

        let conditions = self
            .requests
            .iter()
            .enumerate()
            .map(|(i, request)| format!("({} == {}) && {}", counter.name(), i, request.name()))
            .collect::<Vec<_>>();

        let mut lines = vec![format!("always @(posedge {}) begin", clock.name())];
        for (grant, condition) in self.grants.iter().zip(conditions.iter()) {
            grant.registered.set(true);
            lines.push(format!("  {} <= {};", grant.name(), condition));
        }
        let any_grant = conditions
            .iter()
            .map(|condition| format!("({})", condition))
            .collect::<Vec<_>>()
            .join(" || ");
        lines.push(format!(
            "  if ({}) {counter} <= ({counter} + 1) % {};",
            any_grant,
            requesters,
            counter = counter.name()
        ));
        lines.push("end".into());
        self.module.always(lines.join("\n"));

        Ok(())
    }

    /// Adds combinational static-priority arbitration logic, where the highest requester index wins.
    ///
    /// Emits one assign per grant, highest index first: the top grant follows its request directly, and every other grant is its request gated by the absence of all higher-index requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArbiterAlreadyGenerated`] if arbitration logic was already added to this `Mutex`.
    ///
    /// [`Error::ArbiterAlreadyGenerated`]: ./error/enum.Error.html#variant.ArbiterAlreadyGenerated
    pub fn generate_priority(&self) -> Result<(), Error> {
        self.claim()?;
        for i in (0..self.grants.len()).rev() {
            let higher = &self.requests[i + 1..];
            if higher.is_empty() {
                self.module.assign(self.grants[i], self.requests[i]);
                continue;
            }
            let higher = higher
                .iter()
                .map(|request| request.name())
                .collect::<Vec<_>>()
                .join(" || ");
            self.module.assign_expr(
                self.grants[i],
                &format!("{} && !({})", self.requests[i].name(), higher),
            );
        }
        Ok(())
    }
}

impl<'a> Module<'a> {
    /// Creates a [`Mutex`] called `name` with `requesters` request/grant port pairs, and registers it with this `Module`.
    ///
    /// [`Mutex`]: ./struct.Mutex.html
    pub fn mutex<S: Into<String>>(
        &'a self,
        name: S,
        requesters: usize,
        arbitration: Arbitration,
    ) -> &'a Mutex<'a> {
        let name = name.into();
        let (requests, grants): (Vec<_>, Vec<_>) = (0..requesters)
            .map(|i| {
                (
                    self.input(format!("{}_req_{}", name, i), 1),
                    self.output(format!("{}_grant_{}", name, i), 1),
                )
            })
            .unzip();
        let mutex = self.context.mutex_arena.alloc(Mutex {
            module: self,

            name,
            arbitration,
            requests,
            grants,

            generated: Cell::new(false),
        });
        self.mutexes.borrow_mut().push(mutex);
        mutex
    }
}
