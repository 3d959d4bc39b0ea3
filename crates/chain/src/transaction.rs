//! Programmable transaction model.
//!
//! A [`TransactionRequest`] is an ordered list of [`Command`]s plus a gas
//! budget. Commands reference earlier outputs through [`Argument::Result`]
//! and [`Argument::NestedResult`], which is how a single atomic transaction
//! threads a freshly split coin or a newly opened obligation into later calls.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut tx = TransactionBuilder::new();
//! let coin = tx.split_coin(Argument::object(coin_id), 1_000_000_000);
//! tx.move_call(MoveCall::new(pkg, "staking_manager", "stake_xaum")
//!     .arg(Argument::object(manager))
//!     .arg(coin));
//! let request = tx.build(200_000_000);
//! ```

use serde::{Deserialize, Serialize};

/// Hex-encoded object identifier (`0x...`).
pub type ObjectId = String;

/// Input to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// The coin paying for gas (native SUI).
    GasCoin,
    /// An owned or shared object by id.
    Object(ObjectId),
    /// Pure `u64` value.
    U64(u64),
    /// Pure address value.
    Address(String),
    /// Whole output of command `n`.
    Result(u16),
    /// Output `m` of a command `n` that returns a tuple.
    NestedResult(u16, u16),
}

impl Argument {
    pub fn object(id: impl Into<ObjectId>) -> Self {
        Self::Object(id.into())
    }

    pub fn address(address: impl Into<String>) -> Self {
        Self::Address(address.into())
    }
}

/// Call to a Move entry or public function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    pub fn new(package: impl Into<ObjectId>, module: &str, function: &str) -> Self {
        Self {
            package: package.into(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Add a type argument (fully qualified coin type).
    pub fn type_arg(mut self, type_tag: impl Into<String>) -> Self {
        self.type_arguments.push(type_tag.into());
        self
    }

    /// Append a call argument.
    pub fn arg(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }

    /// Check module and function name, ignoring the package.
    pub fn is(&self, module: &str, function: &str) -> bool {
        self.module == module && self.function == function
    }
}

/// One step of a programmable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    MoveCall(MoveCall),
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Argument,
    },
}

/// Fully formed transaction ready for signing.
///
/// Built fresh per action and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub commands: Vec<Command>,
    pub gas_budget: u64,
}

impl TransactionRequest {
    /// Iterate over the Move calls in command order.
    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }

    /// Whether any call targets `module::function`.
    pub fn calls(&self, module: &str, function: &str) -> bool {
        self.move_calls().any(|c| c.is(module, function))
    }

    /// Number of calls targeting `module::function`.
    pub fn count_calls(&self, module: &str, function: &str) -> usize {
        self.move_calls().filter(|c| c.is(module, function)).count()
    }

    /// Every pure amount passed to a `SplitCoins` command.
    pub fn split_amounts(&self) -> Vec<u64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::SplitCoins { amounts, .. } => Some(amounts),
                _ => None,
            })
            .flatten()
            .filter_map(|a| match a {
                Argument::U64(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Objects consumed as merge sources.
    pub fn merged_sources(&self) -> Vec<&Argument> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::MergeCoins { sources, .. } => Some(sources),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Incremental builder that hands out result handles for later commands.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, command: Command) -> Argument {
        let index = self.commands.len() as u16;
        self.commands.push(command);
        Argument::Result(index)
    }

    /// Append a Move call and return a handle to its result.
    pub fn move_call(&mut self, call: MoveCall) -> Argument {
        self.push(Command::MoveCall(call))
    }

    /// Append a Move call returning an `N`-tuple and return a handle per element.
    pub fn move_call_tuple<const N: usize>(&mut self, call: MoveCall) -> [Argument; N] {
        let index = self.commands.len() as u16;
        self.push(Command::MoveCall(call));
        std::array::from_fn(|i| Argument::NestedResult(index, i as u16))
    }

    /// Merge `sources` into `destination`. A no-op when `sources` is empty.
    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) {
        if sources.is_empty() {
            return;
        }
        self.push(Command::MergeCoins {
            destination,
            sources,
        });
    }

    /// Split a single new coin of `amount` off `coin`.
    pub fn split_coin(&mut self, coin: Argument, amount: u64) -> Argument {
        let index = self.commands.len() as u16;
        self.push(Command::SplitCoins {
            coin,
            amounts: vec![Argument::U64(amount)],
        });
        Argument::NestedResult(index, 0)
    }

    /// Transfer `objects` to `recipient`.
    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: &str) {
        self.push(Command::TransferObjects {
            objects,
            recipient: Argument::address(recipient),
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Finish the transaction with a fixed gas budget.
    pub fn build(self, gas_budget: u64) -> TransactionRequest {
        TransactionRequest {
            commands: self.commands,
            gas_budget,
        }
    }
}
