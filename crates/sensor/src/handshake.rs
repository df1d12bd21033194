use alloy_primitives::B256;
use chain::types::u256_to_be_trimmed;
use devp2p::constants::ETH_PROTOCOL_VERSION;
use devp2p::eth::{EthStatus, STATUS_MSG_ID};
use devp2p::forkid::ForkId;
use devp2p::{DisconnectReason, MsgReadWriter};
use tracing::info;

use crate::decode::DecodeError;
use crate::error::Error;
use crate::head::{HeadBlock, HeadTracker};

/// Our Status for the given head.
pub fn local_status(
    network_id: u64,
    genesis_hash: B256,
    fork_blocks: &[u64],
    head: &HeadBlock,
) -> EthStatus {
    EthStatus {
        protocol_version: ETH_PROTOCOL_VERSION,
        network_id,
        total_difficulty: u256_to_be_trimmed(&head.total_difficulty),
        best_hash: head.hash.0,
        genesis_hash: genesis_hash.0,
        fork_id: ForkId::new(&genesis_hash.0, fork_blocks, head.number),
    }
}

/// Send `local`, then wait for the peer's Status.
///
/// The peer must answer with a Status on the same network, anything else
/// ends the connection before dispatch starts.
pub async fn status_exchange<T: MsgReadWriter>(
    rw: &mut T,
    local: &EthStatus,
) -> Result<EthStatus, Error> {
    rw.write_msg(STATUS_MSG_ID, local.to_rlp()).await?;

    let msg = rw.read_msg().await?;
    if msg.code != STATUS_MSG_ID {
        return Err(Error::UnexpectedMessage {
            expected: "Status",
            got: msg.code,
        });
    }

    let remote = EthStatus::from_rlp(&msg.payload).map_err(DecodeError::from)?;
    if remote.network_id != local.network_id {
        return Err(Error::Disconnect(DisconnectReason::UselessPeer));
    }

    info!(
        version = remote.protocol_version,
        network_id = remote.network_id,
        td = %hex::encode(&remote.total_difficulty),
        best_hash = %hex::encode(remote.best_hash),
        fork_hash = %hex::encode(remote.fork_id.fork_hash),
        fork_next = remote.fork_id.fork_next,
        "New peer"
    );
    Ok(remote)
}

/// Run the status exchange while holding the shared head, so the Status we
/// send and the head other connections see cannot diverge mid-exchange.
pub async fn handshake<T: MsgReadWriter>(
    rw: &mut T,
    network_id: u64,
    genesis_hash: B256,
    fork_blocks: &[u64],
    head: &HeadTracker,
) -> Result<EthStatus, Error> {
    let guard = head.read().await;
    let local = local_status(network_id, genesis_hash, fork_blocks, &guard);
    let result = status_exchange(rw, &local).await;
    drop(guard);
    result
}
