//! EVM Chain Client
//!
//! WebSocket provider with a local signing wallet. Router and ERC-20 bindings are
//! parsed from human-readable ABIs at connect time.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::{parse_abi, Abi};
use ethers::contract::{AbiError, Contract, ContractError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Middleware, PendingTransaction, Provider, Ws};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, BlockNumber, Filter, Log, TransactionReceipt, H256, U256, U64};
use ethers::utils::keccak256;
use futures::StreamExt;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};

use crate::ports::{BlockInfo, BlockTick, ChainError, ChainPort, PairCreated};

type SignerClient = SignerMiddleware<Provider<Ws>, LocalWallet>;

pub const PAIR_CREATED_EVENT: &str = "PairCreated(address,address,address,uint256)";
const TRANSFER_EVENT: &str = "Transfer(address,address,uint256)";

const ROUTER_ABI: &[&str] = &[
    "function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts)",
    "function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts)",
    "function getAmountsOut(uint256 amountIn, address[] path) external view returns (uint256[] amounts)",
];

const ERC20_ABI: &[&str] = &[
    "function allowance(address owner, address spender) external view returns (uint256)",
    "function approve(address spender, uint256 amount) external returns (bool)",
];

const PAIR_CHANNEL_CAPACITY: usize = 256;
const BLOCK_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EvmChainConfig {
    pub ws_url: String,
    pub factory: Address,
    pub router: Address,
}

pub struct EvmChainClient {
    config: EvmChainConfig,
    client: Arc<SignerClient>,
    router: Contract<SignerClient>,
    erc20_abi: Abi,
    /// Shared block stream, `None` until first subscriber or after upstream ends
    blocks: Arc<Mutex<Option<broadcast::Sender<BlockTick>>>>,
}

impl EvmChainClient {
    pub async fn connect(config: EvmChainConfig, private_key: &str) -> Result<Self, ChainError> {
        let provider = Provider::<Ws>::connect(&config.ws_url)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        let block = provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::Signing(e.to_string()))?
            .with_chain_id(chain_id.as_u64());

        tracing::info!(
            "Connected to chain {} at block {} as {:#x}",
            chain_id,
            block,
            wallet.address()
        );

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let router_abi = parse_abi(ROUTER_ABI).map_err(|e| ChainError::UnexpectedResponse(e.to_string()))?;
        let erc20_abi = parse_abi(ERC20_ABI).map_err(|e| ChainError::UnexpectedResponse(e.to_string()))?;
        let router = Contract::new(config.router, router_abi, client.clone());

        Ok(Self {
            config,
            client,
            router,
            erc20_abi,
            blocks: Arc::new(Mutex::new(None)),
        })
    }

    /// Approve the router for `amount` of `token` unless it already is
    async fn ensure_allowance(&self, token: Address, amount: U256) -> Result<(), ChainError> {
        let erc20 = Contract::new(token, self.erc20_abi.clone(), self.client.clone());

        let allowance: U256 = erc20
            .method::<_, U256>("allowance", (self.wallet_address(), self.config.router))
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)?;
        if allowance >= amount {
            return Ok(());
        }

        tracing::info!("Approving router to spend {:#x}", token);
        let approve = erc20
            .method::<_, bool>("approve", (self.config.router, U256::MAX))
            .map_err(abi_error)?;
        let pending = approve.send().await.map_err(contract_error)?;
        confirm(pending).await?;
        Ok(())
    }
}

#[async_trait]
impl ChainPort for EvmChainClient {
    async fn subscribe_pairs(&self) -> Result<mpsc::Receiver<PairCreated>, ChainError> {
        let filter = Filter::new()
            .address(self.config.factory)
            .event(PAIR_CREATED_EVENT);
        let client = self.client.clone();
        let (tx, rx) = mpsc::channel(PAIR_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut stream = match client.provider().subscribe_logs(&filter).await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(ChainError::Subscription(e.to_string())));
                    return;
                }
            };

            while let Some(log) = stream.next().await {
                match decode_pair_created(&log) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    None => tracing::warn!("Skipping malformed PairCreated log {:?}", log.transaction_hash),
                }
            }
            tracing::warn!("PairCreated subscription ended");
        });

        ready_rx
            .await
            .map_err(|_| ChainError::Subscription("pair subscription task exited".into()))??;
        Ok(rx)
    }

    async fn subscribe_blocks(&self) -> Result<broadcast::Receiver<BlockTick>, ChainError> {
        let mut slot = self.blocks.lock().await;
        if let Some(sender) = slot.as_ref() {
            return Ok(sender.subscribe());
        }

        let (tx, rx) = broadcast::channel(BLOCK_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();
        let client = self.client.clone();
        let shared = self.blocks.clone();
        let sender = tx.clone();

        tokio::spawn(async move {
            let mut stream = match client.provider().subscribe_blocks().await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(ChainError::Subscription(e.to_string())));
                    return;
                }
            };

            while let Some(block) = stream.next().await {
                if let Some(number) = block.number {
                    // No receivers is fine, positions come and go
                    let _ = sender.send(BlockTick { number: number.as_u64() });
                }
            }

            tracing::warn!("Block subscription ended");
            *shared.lock().await = None;
        });

        ready_rx
            .await
            .map_err(|_| ChainError::Subscription("block subscription task exited".into()))??;
        *slot = Some(tx);
        Ok(rx)
    }

    async fn latest_block(&self) -> Result<BlockInfo, ChainError> {
        let block = self
            .client
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .ok_or_else(|| ChainError::UnexpectedResponse("no latest block".into()))?;

        let number = block
            .number
            .ok_or_else(|| ChainError::UnexpectedResponse("latest block has no number".into()))?;
        let timestamp = Some(block.timestamp)
            .filter(|t| !t.is_zero())
            .map(|t| t.low_u64());

        Ok(BlockInfo {
            number: number.as_u64(),
            timestamp,
        })
    }

    async fn swap_exact_eth_for_tokens(
        &self,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
        value: U256,
    ) -> Result<Vec<U256>, ChainError> {
        let token = path.last().copied();
        let call = self
            .router
            .method::<_, Vec<U256>>(
                "swapExactETHForTokens",
                (amount_out_min, path, recipient, deadline),
            )
            .map_err(abi_error)?
            .value(value);

        // Simulate first so reverts come back with a reason
        let mut amounts = call.call().await.map_err(contract_error)?;
        let pending = call.send().await.map_err(contract_error)?;
        let receipt = confirm(pending).await?;

        if let (Some(token), Some(last)) = (token, amounts.last_mut()) {
            if let Some(received) = transferred_to(&receipt, token, recipient) {
                *last = received;
            }
        }
        Ok(amounts)
    }

    async fn swap_exact_tokens_for_eth(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    ) -> Result<Vec<U256>, ChainError> {
        let token = path
            .first()
            .copied()
            .ok_or_else(|| ChainError::UnexpectedResponse("empty swap path".into()))?;
        self.ensure_allowance(token, amount_in).await?;

        let call = self
            .router
            .method::<_, Vec<U256>>(
                "swapExactTokensForETH",
                (amount_in, amount_out_min, path, recipient, deadline),
            )
            .map_err(abi_error)?;

        let amounts = call.call().await.map_err(contract_error)?;
        let pending = call.send().await.map_err(contract_error)?;
        confirm(pending).await?;
        Ok(amounts)
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ChainError> {
        self.router
            .method::<_, Vec<U256>>("getAmountsOut", (amount_in, path))
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    fn wallet_address(&self) -> Address {
        self.client.address()
    }
}

/// Wait for inclusion; a receipt with status 0 is a revert without reason
async fn confirm(pending: PendingTransaction<'_, Ws>) -> Result<TransactionReceipt, ChainError> {
    let receipt = pending
        .await
        .map_err(|e| ChainError::Transport(e.to_string()))?
        .ok_or_else(|| ChainError::UnexpectedResponse("transaction dropped from mempool".into()))?;

    if receipt.status != Some(U64::one()) {
        return Err(ChainError::Reverted { reason: None });
    }
    Ok(receipt)
}

/// Method lookup or argument encoding failed before anything was sent
fn abi_error(error: AbiError) -> ChainError {
    ChainError::UnexpectedResponse(error.to_string())
}

fn contract_error(error: ContractError<SignerClient>) -> ChainError {
    if let Some(reason) = error.decode_revert::<String>() {
        return ChainError::Reverted {
            reason: Some(reason),
        };
    }
    if let Some(data) = error.as_revert() {
        return ChainError::Reverted {
            reason: Some(data.to_string()),
        };
    }
    match error {
        ContractError::AbiError(e) => ChainError::UnexpectedResponse(e.to_string()),
        ContractError::DetokenizationError(e) => ChainError::UnexpectedResponse(e.to_string()),
        other => ChainError::Transport(other.to_string()),
    }
}

/// Decode a factory `PairCreated` log: tokens are indexed, pair is the first data word
pub fn decode_pair_created(log: &Log) -> Option<PairCreated> {
    if log.topics.len() < 3 || log.data.len() < 32 {
        return None;
    }

    Some(PairCreated {
        token0: topic_address(&log.topics[1]),
        token1: topic_address(&log.topics[2]),
        pair: Address::from_slice(&log.data[12..32]),
    })
}

/// Total ERC-20 `Transfer` of `token` into `recipient` within a receipt
fn transferred_to(receipt: &TransactionReceipt, token: Address, recipient: Address) -> Option<U256> {
    let transfer = H256::from(keccak256(TRANSFER_EVENT));

    receipt
        .logs
        .iter()
        .filter(|log| log.address == token && log.topics.len() == 3 && log.topics[0] == transfer)
        .filter(|log| topic_address(&log.topics[2]) == recipient && log.data.len() >= 32)
        .map(|log| U256::from_big_endian(&log.data[..32]))
        .reduce(|total, value| total.saturating_add(value))
}

fn topic_address(topic: &H256) -> Address {
    Address::from_slice(&topic.as_bytes()[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::contract::BaseContract;
    use ethers::types::Bytes;

    fn address_topic(address: Address) -> H256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_bytes());
        H256::from(word)
    }

    #[test]
    fn test_decode_pair_created() {
        let token0 = Address::repeat_byte(0x11);
        let token1 = Address::repeat_byte(0x22);
        let pair = Address::repeat_byte(0x33);

        let mut data = vec![0u8; 64];
        data[12..32].copy_from_slice(pair.as_bytes());
        data[63] = 7;

        let log = Log {
            topics: vec![
                H256::from(keccak256(PAIR_CREATED_EVENT)),
                address_topic(token0),
                address_topic(token1),
            ],
            data: Bytes::from(data),
            ..Default::default()
        };

        let event = decode_pair_created(&log).unwrap();
        assert_eq!(event, PairCreated { token0, token1, pair });
    }

    #[test]
    fn test_router_abi_accepts_swap_arguments() {
        let router = BaseContract::from(parse_abi(ROUTER_ABI).unwrap());
        let path = vec![Address::repeat_byte(0xee), Address::repeat_byte(0x11)];
        let wallet = Address::repeat_byte(0xaa);
        let deadline = U256::from(1_700_000_014u64);

        assert!(router
            .encode("swapExactETHForTokens", (U256::zero(), path.clone(), wallet, deadline))
            .is_ok());
        assert!(router
            .encode(
                "swapExactTokensForETH",
                (U256::from(5000u64), U256::zero(), path.clone(), wallet, deadline)
            )
            .is_ok());
        assert!(router.encode("getAmountsOut", (U256::one(), path)).is_ok());
    }

    #[test]
    fn test_erc20_abi_accepts_allowance_arguments() {
        let erc20 = BaseContract::from(parse_abi(ERC20_ABI).unwrap());
        let owner = Address::repeat_byte(0xaa);
        let router = Address::repeat_byte(0x77);

        assert!(erc20.encode("allowance", (owner, router)).is_ok());
        assert!(erc20.encode("approve", (router, U256::MAX)).is_ok());
    }

    #[test]
    fn test_abi_error_is_unexpected_response() {
        let router = BaseContract::from(parse_abi(ROUTER_ABI).unwrap());
        let error = router.encode("swapExactTokensForTokens", (U256::one(),)).unwrap_err();

        assert!(matches!(abi_error(error), ChainError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_decode_pair_created_short_log() {
        let log = Log {
            topics: vec![H256::zero(), H256::zero()],
            data: Bytes::from(vec![0u8; 64]),
            ..Default::default()
        };
        assert!(decode_pair_created(&log).is_none());
    }

    #[test]
    fn test_transferred_to_sums_matching_logs() {
        let token = Address::repeat_byte(0x11);
        let wallet = Address::repeat_byte(0xaa);
        let transfer = H256::from(keccak256(TRANSFER_EVENT));

        let transfer_log = |to: Address, amount: u64| {
            let mut data = [0u8; 32];
            U256::from(amount).to_big_endian(&mut data);
            Log {
                address: token,
                topics: vec![transfer, address_topic(Address::repeat_byte(0x33)), address_topic(to)],
                data: Bytes::from(data.to_vec()),
                ..Default::default()
            }
        };

        let receipt = TransactionReceipt {
            logs: vec![
                transfer_log(wallet, 900),
                transfer_log(Address::repeat_byte(0x44), 100),
                transfer_log(wallet, 50),
            ],
            ..Default::default()
        };

        assert_eq!(transferred_to(&receipt, token, wallet), Some(U256::from(950u64)));
        assert_eq!(transferred_to(&receipt, Address::repeat_byte(0x99), wallet), None);
    }
}
