/// 낙찰 예약 스케줄러
/// 세 번째 콜 이후 유예 시간이 지나면 낙찰을 실행한다.
/// 유예 시간 안에 새 입찰이나 방 종료가 있으면 예약은 취소된다.
// region:    --- Imports
use crate::auction::model::ItemId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

// endregion: --- Imports

// region:    --- Sale Scheduler
struct ScheduledSale {
    epoch: u64,
    handle: AbortHandle,
}

/// 상품 id 별 예약 낙찰 관리
#[derive(Clone, Default)]
pub struct SaleScheduler {
    tasks: Arc<DashMap<ItemId, ScheduledSale>>,
}

impl SaleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 낙찰 예약
    /// 같은 상품에 이미 예약이 있으면 기존 예약을 취소하고 교체한다.
    pub fn schedule<F>(&self, item_id: ItemId, epoch: u64, delay: Duration, on_due: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // 엔트리를 잡은 채로 spawn 해야 작업이 먼저 끝나도 목록에 남지 않는다
        let entry = self.tasks.entry(item_id);
        let tasks = Arc::clone(&self.tasks);
        let join = tokio::spawn(async move {
            sleep(delay).await;
            // 실행 직전 자신을 목록에서 제거 (이후에는 취소되지 않음)
            tasks.remove_if(&item_id, |_, sale| sale.epoch == epoch);
            on_due.await;
        });

        let sale = ScheduledSale {
            epoch,
            handle: join.abort_handle(),
        };
        match entry {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(sale);
                previous.handle.abort();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(sale);
            }
        }
        debug!(
            "{:<12} --> 낙찰 예약: item={}, epoch={}, delay={:?}",
            "Scheduler", item_id, epoch, delay
        );
    }

    /// 예약 취소. 취소된 예약이 있었으면 true
    pub fn cancel(&self, item_id: &ItemId) -> bool {
        match self.tasks.remove(item_id) {
            Some((_, sale)) => {
                sale.handle.abort();
                debug!(
                    "{:<12} --> 낙찰 예약 취소: item={}, epoch={}",
                    "Scheduler", item_id, sale.epoch
                );
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, item_id: &ItemId) -> bool {
        self.tasks.contains_key(item_id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}

// endregion: --- Sale Scheduler

// endregion: --- Tests
