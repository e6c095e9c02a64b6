use courier_client::pb::{
    AddCourierRequest, AddCourierResponse, Address, Courier, DeleteCourierRequest,
    DeleteResponse, GetCourierRequest, GetCourierResponse, SearchCouriersRequest,
    SearchCouriersResponse, UpdateCourierRequest, UpdateCourierResponse,
};
use courier_api::Couriers;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tonic::{Request, Response, Status};

/// Metadata observed by the service for a single call.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub method: &'static str,
    pub caller: Option<String>,
    pub request_id: Option<String>,
    pub has_deadline: bool,
}

// In-memory courier store. Not every test uses every helper.
#[allow(dead_code)]
#[derive(Default)]
pub struct CourierServiceImpl {
    couriers: Mutex<HashMap<String, Courier>>,
    next_id: AtomicU64,
    seen: Mutex<Vec<SeenCall>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl CourierServiceImpl {
    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn seen_calls(&self) -> Vec<SeenCall> {
        self.seen.lock().unwrap().clone()
    }

    async fn observe<T>(&self, method: &'static str, req: &Request<T>) {
        let header = |key: &str| {
            req.metadata()
                .get(key)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        self.seen.lock().unwrap().push(SeenCall {
            method,
            caller: header("service-client"),
            request_id: header("x-request-id"),
            has_deadline: req.metadata().get("grpc-timeout").is_some(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn matches_filter(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

#[tonic::async_trait]
impl Couriers for CourierServiceImpl {
    async fn register_courier(
        &self,
        request: Request<AddCourierRequest>,
    ) -> Result<Response<AddCourierResponse>, Status> {
        self.observe("RegisterCourier", &request).await;
        let req = request.into_inner();

        if req.name.is_empty() || req.org.is_empty() {
            return Err(Status::invalid_argument("missing courier name or org"));
        }

        let id = format!("courier-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = SystemTime::now();

        let courier = Courier {
            id: id.clone(),
            name: req.name,
            org: req.org,
            address: Some(Address {
                street: req.street,
                city: req.city,
                state: req.state,
                postal_code: req.postal_code,
                country: req.country,
            }),
            height: req.height,
            width: req.width,
            depth: req.depth,
            created_by: req.requested_by.clone(),
            updated_by: req.requested_by,
            created_at: Some(now.into()),
            updated_at: Some(now.into()),
        };

        self.couriers.lock().unwrap().insert(id, courier.clone());

        Ok(Response::new(AddCourierResponse {
            ok: true,
            courier: Some(courier),
        }))
    }

    async fn update_courier(
        &self,
        request: Request<UpdateCourierRequest>,
    ) -> Result<Response<UpdateCourierResponse>, Status> {
        self.observe("UpdateCourier", &request).await;
        let req = request.into_inner();

        let mut couriers = self.couriers.lock().unwrap();
        let courier = couriers
            .get_mut(&req.id)
            .ok_or_else(|| Status::not_found(format!("courier {} not found", req.id)))?;

        courier.address = Some(Address {
            street: req.street,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
        });
        courier.height = req.height;
        courier.width = req.width;
        courier.depth = req.depth;
        courier.updated_by = req.requested_by;
        courier.updated_at = Some(SystemTime::now().into());

        Ok(Response::new(UpdateCourierResponse {
            courier: Some(courier.clone()),
        }))
    }

    async fn get_courier(
        &self,
        request: Request<GetCourierRequest>,
    ) -> Result<Response<GetCourierResponse>, Status> {
        self.observe("GetCourier", &request).await;
        let id = request.into_inner().id;

        let courier = self
            .couriers
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("courier {id} not found")))?;

        Ok(Response::new(GetCourierResponse {
            courier: Some(courier),
        }))
    }

    async fn search_couriers(
        &self,
        request: Request<SearchCouriersRequest>,
    ) -> Result<Response<SearchCouriersResponse>, Status> {
        self.observe("SearchCouriers", &request).await;
        let req = request.into_inner();

        let mut couriers: Vec<_> = self
            .couriers
            .lock()
            .unwrap()
            .values()
            .filter(|c| {
                let addr = c.address.clone().unwrap_or_default();
                matches_filter(&req.org, &c.org)
                    && matches_filter(&req.name, &c.name)
                    && matches_filter(&req.city, &addr.city)
                    && matches_filter(&req.postal_code, &addr.postal_code)
                    && matches_filter(&req.country, &addr.country)
            })
            .cloned()
            .collect();
        couriers.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Response::new(SearchCouriersResponse { couriers }))
    }

    async fn delete_courier(
        &self,
        request: Request<DeleteCourierRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        self.observe("DeleteCourier", &request).await;
        let id = request.into_inner().id;

        match self.couriers.lock().unwrap().remove(&id) {
            Some(_) => Ok(Response::new(DeleteResponse { ok: true })),
            None => Err(Status::not_found(format!("courier {id} not found"))),
        }
    }
}
