//! In-memory chain, signer and faucet doubles for unit tests.

use async_trait::async_trait;
use creek_api::{FaucetApi, FaucetResponse};
use creek_chain::{
    Argument, ChainClient, ChainError, CoinObjectRef, ExecutionStatus, ObjectChange,
    ObjectChangeKind, SignedTransaction, SignerFactory, TransactionEvent, TransactionRequest,
    TransactionResult, TransactionSigner,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::config::{BotConfig, CoinTypes, Token};

/// How a successful `open_obligation` reports the new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObligationMode {
    Event,
    ObjectChanges,
    Nothing,
}

#[derive(Default)]
struct ChainState {
    native: u64,
    coins: HashMap<Token, Vec<CoinObjectRef>>,
    next_object: u64,
    empty_fetches: HashMap<Token, u32>,
    rate_limited_fetches: HashMap<Token, u32>,
    undecodable_fetches: HashMap<Token, u32>,
    fetches: HashMap<Token, u32>,
    submitted: Vec<TransactionRequest>,
    senders: Vec<String>,
    failing: Vec<(String, String)>,
    submit_rate_limited: bool,
    panic_on_balance: bool,
    obligation_mode: Option<ObligationMode>,
}

/// Chain double. Mints credit the minted token; nothing else moves balances.
pub struct MockChain {
    coin_types: CoinTypes,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            coin_types: config.protocol.coin_types.clone(),
            state: Mutex::new(ChainState::default()),
        }
    }

    fn token_for(&self, coin_type: &str) -> Option<Token> {
        [Token::Gr, Token::Sui, Token::Usdc, Token::Gusd, Token::Xaum, Token::Gy]
            .into_iter()
            .find(|t| t.coin_type(&self.coin_types) == coin_type)
    }

    pub fn add_coin(&self, token: Token, balance: u64) {
        let mut state = self.state.lock();
        state.next_object += 1;
        let id = format!("0xcoin{}", state.next_object);
        state
            .coins
            .entry(token)
            .or_default()
            .push(CoinObjectRef { id, balance });
    }

    pub fn set_native_balance(&self, balance: u64) {
        self.state.lock().native = balance;
    }

    pub fn credit_native(&self, amount: u64) {
        self.state.lock().native += amount;
    }

    /// Next `n` fetches of `token` return no coins.
    pub fn set_empty_fetches(&self, token: Token, n: u32) {
        self.state.lock().empty_fetches.insert(token, n);
    }

    /// Next `n` fetches of `token` fail as rate limited.
    pub fn set_rate_limited_fetches(&self, token: Token, n: u32) {
        self.state.lock().rate_limited_fetches.insert(token, n);
    }

    /// Next `n` fetches of `token` fail with an undecodable response.
    pub fn set_undecodable_fetches(&self, token: Token, n: u32) {
        self.state.lock().undecodable_fetches.insert(token, n);
    }

    /// Any transaction calling `module::function` executes with a failure status.
    pub fn fail_calls(&self, module: &str, function: &str) {
        self.state
            .lock()
            .failing
            .push((module.to_string(), function.to_string()));
    }

    pub fn set_submit_rate_limited(&self, on: bool) {
        self.state.lock().submit_rate_limited = on;
    }

    pub fn set_panic_on_balance(&self, on: bool) {
        self.state.lock().panic_on_balance = on;
    }

    pub fn set_obligation_mode(&self, mode: ObligationMode) {
        self.state.lock().obligation_mode = Some(mode);
    }

    pub fn coin_fetches(&self, token: Token) -> u32 {
        self.state.lock().fetches.get(&token).copied().unwrap_or(0)
    }

    pub fn total_coin_fetches(&self) -> u32 {
        self.state.lock().fetches.values().sum()
    }

    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.state.lock().submitted.clone()
    }

    /// Sender address of every submission, in order.
    pub fn senders(&self) -> Vec<String> {
        self.state.lock().senders.clone()
    }

    fn apply(&self, state: &mut ChainState, request: &TransactionRequest) -> TransactionResult {
        let digest = format!("MockDigest{:06}", state.submitted.len());
        let mut events = Vec::new();
        let mut object_changes = Vec::new();

        for call in request.move_calls() {
            if call.function == "mint" {
                let token = match call.module.as_str() {
                    "coin_xaum" => Some(Token::Xaum),
                    "usdc" => Some(Token::Usdc),
                    _ => None,
                };
                if let (Some(token), Some(Argument::U64(amount))) = (token, call.arguments.get(1))
                {
                    state.next_object += 1;
                    let id = format!("0xcoin{}", state.next_object);
                    state.coins.entry(token).or_default().push(CoinObjectRef {
                        id,
                        balance: *amount,
                    });
                }
            }

            if call.is("open_obligation", "open_obligation") {
                state.next_object += 1;
                let obligation = format!("0xobligation{}", state.next_object);
                let key = format!("0xkey{}", state.next_object);
                let package = &call.package;
                match state.obligation_mode.unwrap_or(ObligationMode::Event) {
                    ObligationMode::Event => events.push(TransactionEvent {
                        event_type: format!("{}::open_obligation::ObligationCreatedEvent", package),
                        parsed_json: json!({ "obligation": obligation, "obligation_key": key }),
                    }),
                    ObligationMode::ObjectChanges => {
                        object_changes.push(ObjectChange {
                            kind: ObjectChangeKind::Created,
                            object_type: Some(format!("{}::obligation::ObligationKey", package)),
                            object_id: Some(key),
                        });
                        object_changes.push(ObjectChange {
                            kind: ObjectChangeKind::Created,
                            object_type: Some(format!("{}::obligation::Obligation", package)),
                            object_id: Some(obligation),
                        });
                    }
                    ObligationMode::Nothing => {}
                }
            }
        }

        TransactionResult {
            status: ExecutionStatus::Success,
            error: None,
            digest,
            events,
            object_changes,
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_balance(&self, _address: &str) -> Result<u64, ChainError> {
        let (panic, native) = {
            let state = self.state.lock();
            (state.panic_on_balance, state.native)
        };
        if panic {
            panic!("balance endpoint exploded");
        }
        Ok(native)
    }

    async fn get_coins(
        &self,
        _address: &str,
        coin_type: &str,
    ) -> Result<Vec<CoinObjectRef>, ChainError> {
        let Some(token) = self.token_for(coin_type) else {
            return Ok(Vec::new());
        };
        let mut state = self.state.lock();
        *state.fetches.entry(token).or_default() += 1;

        if let Some(n) = state.rate_limited_fetches.get_mut(&token) {
            if *n > 0 {
                *n -= 1;
                return Err(ChainError::RateLimited);
            }
        }
        if let Some(n) = state.undecodable_fetches.get_mut(&token) {
            if *n > 0 {
                *n -= 1;
                return Err(ChainError::Decode("unexpected coin page".to_string()));
            }
        }
        if let Some(n) = state.empty_fetches.get_mut(&token) {
            if *n > 0 {
                *n -= 1;
                return Ok(Vec::new());
            }
        }
        Ok(state.coins.get(&token).cloned().unwrap_or_default())
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionResult, ChainError> {
        signer.sign(request).await?;

        let mut state = self.state.lock();
        if state.submit_rate_limited {
            return Err(ChainError::RateLimited);
        }
        state.submitted.push(request.clone());
        state.senders.push(signer.address().to_string());

        let failing = state
            .failing
            .iter()
            .any(|(m, f)| request.calls(m, f));
        if failing {
            return Ok(TransactionResult {
                status: ExecutionStatus::Failure,
                error: Some("MoveAbort(1)".to_string()),
                digest: format!("MockDigest{:06}", state.submitted.len()),
                events: Vec::new(),
                object_changes: Vec::new(),
            });
        }
        Ok(self.apply(&mut state, request))
    }
}

/// Signer with a fixed address.
pub struct MockSigner {
    address: String,
}

impl MockSigner {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, request: &TransactionRequest) -> Result<SignedTransaction, ChainError> {
        Ok(SignedTransaction {
            tx_bytes: format!("{}cmds", request.commands.len()),
            signature: format!("sig-{}", self.address),
        })
    }
}

/// Derives `0x<key>`; keys starting with `bad` fail.
pub struct MockSignerFactory;

#[async_trait]
impl SignerFactory for MockSignerFactory {
    async fn signer_for(&self, secret_key: &str) -> Result<Box<dyn TransactionSigner>, ChainError> {
        if secret_key.starts_with("bad") {
            return Err(ChainError::Signing("undecodable key".to_string()));
        }
        Ok(Box::new(MockSigner::new(&format!("0x{}", secret_key))))
    }
}

/// Scripted faucet. `Funded` credits the chain's native balance.
pub struct MockFaucet {
    chain: Arc<MockChain>,
    grant: u64,
    script: Mutex<VecDeque<FaucetResponse>>,
    fallback: FaucetResponse,
    requests: Mutex<Vec<Option<String>>>,
}

impl MockFaucet {
    /// Always funds `grant`.
    pub fn funding(chain: Arc<MockChain>, grant: u64) -> Self {
        Self {
            chain,
            grant,
            script: Mutex::new(VecDeque::new()),
            fallback: FaucetResponse::Funded,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `response`.
    pub fn always(chain: Arc<MockChain>, response: FaucetResponse) -> Self {
        Self {
            fallback: response,
            ..Self::funding(chain, 10_000_000_000)
        }
    }

    /// Answers from `responses` first, then the fallback.
    pub fn with_script(self, responses: Vec<FaucetResponse>) -> Self {
        *self.script.lock() = responses.into();
        self
    }

    pub fn with_grant(mut self, grant: u64) -> Self {
        self.grant = grant;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn proxies_seen(&self) -> Vec<Option<String>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FaucetApi for MockFaucet {
    async fn request_gas(&self, _recipient: &str, proxy: Option<&str>) -> FaucetResponse {
        self.requests.lock().push(proxy.map(str::to_string));
        let response = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if response.is_funded() {
            self.chain.credit_native(self.grant);
        }
        response
    }
}
