//! Notification text.
//!
//! The layout (and its Russian wording) is what recipients of the existing
//! bot already read; keep it stable.

use crate::conversion::{ThresholdStatus, conversion_rate};
use crate::types::{DeltaResult, ItemMetric, MetricsSnapshot, TIMESTAMP_FORMAT};

/// Per-SKU line of the breakdown, computed for an item with activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub sku_id: String,
    pub sku_name: String,
    pub hits_to_cart: u64,
    pub ordered_units: u64,
    pub rate: f64,
    pub status: ThresholdStatus,
}

impl ItemReport {
    /// `None` for items with no cart-adds and no orders.
    pub fn from_item(item: &ItemMetric, threshold_pct: u32) -> Option<Self> {
        if !item.has_activity() {
            return None;
        }

        Some(Self {
            sku_id: item.sku_id.clone(),
            sku_name: item.sku_name.clone(),
            hits_to_cart: item.hits_to_cart,
            ordered_units: item.ordered_units,
            rate: conversion_rate(item.ordered_units, item.hits_to_cart),
            status: ThresholdStatus::classify(item.ordered_units, item.hits_to_cart, threshold_pct),
        })
    }
}

pub(crate) struct MessageParts<'a> {
    pub snapshot: &'a MetricsSnapshot,
    pub delta: DeltaResult,
    pub hour_rate: f64,
    pub day_rate: f64,
    pub alert: bool,
    pub threshold_pct: u32,
    pub items: &'a [ItemReport],
}

pub(crate) fn render_message(parts: &MessageParts<'_>) -> String {
    let mut message = String::new();

    if parts.alert {
        message.push_str(&alert_banner(parts.threshold_pct));
    }

    message.push_str(&format!(
        "Дата и время: {}\n\
         \n\
         Общее добавление в корзину: {}\n\
         Общее количество заказов: {}\n\
         \n\
         Новые добавления в корзину: {}\n\
         Новые заказы: {}\n\
         \n\
         Конверсия за последний час: {:.2}%\n\
         Конверсия за последний день: {:.2}%",
        parts.snapshot.timestamp.format(TIMESTAMP_FORMAT),
        parts.snapshot.total_add_to_cart,
        parts.snapshot.total_ordered_units,
        parts.delta.new_add_to_cart,
        parts.delta.new_ordered_units,
        parts.hour_rate,
        parts.day_rate,
    ));

    message.push_str("\n\nПодробная информация по каждому товару:\n");
    for item in parts.items {
        message.push_str(&render_item(item, parts.threshold_pct));
    }

    message
}

pub fn alert_banner(threshold_pct: u32) -> String {
    format!("❌ОБЩАЯ КОНВЕРСИЯ МЕНЬШЕ {threshold_pct}%❌\n\n")
}

fn render_item(item: &ItemReport, threshold_pct: u32) -> String {
    let status = match item.status {
        ThresholdStatus::Meets => format!("✅ Конверсия выше ({threshold_pct}%) ✅"),
        ThresholdStatus::Below => format!("❌ Конверсия ниже ({threshold_pct}%) ❌"),
    };

    format!(
        "\nТовар: {}\n\
         Артикул (ID): {}\n\
         Добавлено в корзину: {}\n\
         Заказано: {}\n\
         Конверсия: {:.2}% - {}\n",
        item.sku_name, item.sku_id, item.hits_to_cart, item.ordered_units, item.rate, status,
    )
}
