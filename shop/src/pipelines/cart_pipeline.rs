// shop/src/pipelines/cart_pipeline.rs

//! One pipeline serves every cart operation. The `CartCommand` in the context
//! decides which steps run; the rest are skipped.

use crate::errors::AppError;
use crate::models::{CartError, CartView};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{CartCommand, CartCtxData};
use orka::{ContextData, Orka, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn skip_unless(applies: fn(&CartCtxData) -> bool) -> SkipCondition<CartCtxData> {
  Arc::new(move |ctx: ContextData<CartCtxData>| !applies(&ctx.read()))
}

fn is_add(ctx: &CartCtxData) -> bool {
  matches!(ctx.command, CartCommand::Add { .. })
}

fn is_clear(ctx: &CartCtxData) -> bool {
  matches!(ctx.command, CartCommand::Clear)
}

fn is_not_clear(ctx: &CartCtxData) -> bool {
  !is_clear(ctx)
}

fn is_line_edit(ctx: &CartCtxData) -> bool {
  matches!(
    ctx.command,
    CartCommand::Add { .. } | CartCommand::SetQuantity { .. } | CartCommand::Remove { .. }
  )
}

fn is_stale_view(ctx: &CartCtxData) -> bool {
  matches!(ctx.command, CartCommand::View) && ctx.total_changed
}

/// Accepts 1..=u32::MAX. Anything else is a client error.
fn positive_quantity(raw: i64) -> Result<u32, AppError> {
  if raw < 1 {
    return Err(CartError::InvalidQuantity.into());
  }
  u32::try_from(raw).map_err(|_| CartError::QuantityOverflow.into())
}

pub fn register_cart_pipeline(orka_registry: &Arc<Orka<AppError>>) {
  let mut p = Pipeline::<CartCtxData, AppError>::new(&[
    ("validate_cart_command", false, None),
    ("resolve_product", false, Some(skip_unless(is_add))),
    ("load_cart", false, Some(skip_unless(is_not_clear))),
    ("apply_cart_command", false, Some(skip_unless(is_line_edit))),
    ("clear_cart_document", false, Some(skip_unless(is_clear))),
    ("reprice_cart", false, None),
    ("persist_cart", false, Some(skip_unless(is_line_edit))),
    ("persist_repriced_total", true, Some(skip_unless(is_stale_view))),
    ("render_cart_view", false, None),
  ]);

  p.on_root("validate_cart_command", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let raw_quantity = {
        let guard = ctx_data.read();
        debug!(user_id = %guard.user_id, command = guard.command.name(), "Validating cart command.");
        match guard.command {
          CartCommand::Add { quantity, .. } | CartCommand::SetQuantity { quantity, .. } => Some(quantity),
          _ => None,
        }
      };

      if let Some(raw) = raw_quantity {
        let quantity = positive_quantity(raw).map_err(|e| {
          warn!(quantity = raw, "Rejected cart quantity.");
          e
        })?;
        ctx_data.write().quantity = Some(quantity);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("resolve_product", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let (product_id, catalog) = {
        let guard = ctx_data.read();
        let product_id = match &guard.command {
          CartCommand::Add { product_id, .. } => *product_id,
          _ => return Err(AppError::Internal("resolve_product ran for a non-add command".to_string())),
        };
        (product_id, guard.app_state.catalog.clone())
      };

      let product = catalog.find_product(product_id).await?.ok_or_else(|| {
        warn!(%product_id, "Add to cart for unknown product.");
        AppError::NotFound("Product not found or invalid ID.".to_string())
      })?;

      ctx_data.write().product = Some(product);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("load_cart", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let (user_id, create_if_missing, carts) = {
        let guard = ctx_data.read();
        let create = matches!(guard.command, CartCommand::View | CartCommand::Add { .. });
        (guard.user_id, create, guard.app_state.carts.clone())
      };

      let cart = match carts.find_cart(user_id).await? {
        Some(cart) => cart,
        None if create_if_missing => {
          info!(%user_id, "Creating cart on first use.");
          carts.create_cart(user_id).await?
        }
        None => return Err(AppError::NotFound("Cart not found for this user.".to_string())),
      };

      ctx_data.write().cart = Some(cart);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("apply_cart_command", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let command = guard.command.clone();
      let quantity = guard.quantity;
      let cart = guard
        .cart
        .as_mut()
        .ok_or_else(|| AppError::Internal("cart not loaded before apply_cart_command".to_string()))?;

      match command {
        CartCommand::Add { product_id, variant, .. } => {
          let qty = quantity.ok_or_else(|| AppError::Internal("quantity not validated".to_string()))?;
          let line_id = cart.add_line(product_id, qty, variant)?;
          debug!(%product_id, %line_id, quantity = qty, "Added to cart line.");
        }
        CartCommand::SetQuantity { line_id, .. } => {
          let qty = quantity.ok_or_else(|| AppError::Internal("quantity not validated".to_string()))?;
          cart.set_quantity(line_id, qty)?;
          debug!(%line_id, quantity = qty, "Set cart line quantity.");
        }
        CartCommand::Remove { line_id } => {
          cart.remove_line(line_id)?;
          debug!(%line_id, "Removed cart line.");
        }
        CartCommand::View | CartCommand::Clear => {}
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("clear_cart_document", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let (user_id, carts) = {
        let guard = ctx_data.read();
        (guard.user_id, guard.app_state.carts.clone())
      };

      let cart = carts.clear_cart(user_id).await?;
      info!(%user_id, version = cart.version, "Cart cleared.");
      ctx_data.write().cart = Some(cart);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("reprice_cart", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let (mut cart, catalog) = {
        let guard = ctx_data.read();
        let cart = guard
          .cart
          .clone()
          .ok_or_else(|| AppError::Internal("no cart to reprice".to_string()))?;
        (cart, guard.app_state.catalog.clone())
      };

      let (products, changed) = common_steps::reprice_cart(catalog.as_ref(), &mut cart).await?;
      if changed {
        debug!(owner = %cart.owner, total = cart.total, "Cart total recomputed from live prices.");
      }

      let mut guard = ctx_data.write();
      guard.cart = Some(cart);
      guard.catalog = products;
      guard.total_changed = changed;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  let persist = |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let (cart, carts) = {
        let guard = ctx_data.read();
        let cart = guard
          .cart
          .clone()
          .ok_or_else(|| AppError::Internal("no cart to persist".to_string()))?;
        (cart, guard.app_state.carts.clone())
      };

      let saved = carts.save_cart(&cart).await.map_err(|e| {
        warn!(owner = %cart.owner, version = cart.version, error = %e, "Cart save rejected.");
        AppError::from(e)
      })?;
      ctx_data.write().cart = Some(saved);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  };
  p.on_root("persist_cart", persist);
  p.on_root("persist_repriced_total", persist);

  p.on_root("render_cart_view", |ctx_data: ContextData<CartCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let view = match &guard.cart {
        Some(cart) => CartView::build(cart, &guard.catalog),
        None => return Err(AppError::Internal("no cart to render".to_string())),
      };
      guard.view = Some(view);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_registry.register_pipeline(p);
  tracing::info!("Cart pipeline registered.");
}
