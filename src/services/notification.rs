// src/services/notification.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

/// Mensagem pronta a enviar.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: Message) -> anyhow::Result<()>;
}

/// Envio via log estruturado (sem servidor SMTP configurado).
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: Message) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "📧 Notificação enviada"
        );
        tracing::debug!(body = %message.body, "📧 Corpo da notificação");
        Ok(())
    }
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Falhas de envio nunca derrubam o pedido: apenas ficam no log.
pub async fn notify_quietly(notifier: &dyn Notifier, message: Message) {
    let to = message.to.clone();
    if let Err(e) = notifier.send(message).await {
        tracing::error!("❌ Falha ao enviar notificação para {}: {:?}", to, e);
    }
}

fn time_text(start: Option<NaiveTime>, end: Option<NaiveTime>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!(
            " from {} to {}",
            start.format("%H:%M"),
            end.format("%H:%M")
        ),
        _ => String::new(),
    }
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "N/A".to_string())
}

// =============================================================================
//  RESERVAS
// =============================================================================

/// `action`: "created", "updated", "confirmed", "cancelled"...
pub fn booking_changed(
    to: &str,
    action: &str,
    date: Option<NaiveDate>,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Message {
    let mut capitalized = action.to_string();
    if let Some(first) = capitalized.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Message {
        to: to.to_string(),
        subject: format!("Reservation {} Notification", capitalized),
        body: format!(
            "Your reservation for {}{} has been {}.",
            date_text(date),
            time_text(start, end),
            action
        ),
    }
}

pub struct ReminderDetails<'a> {
    pub recipient_name: &'a str,
    pub professional_name: &'a str,
    pub title: Option<&'a str>,
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

pub fn booking_reminder(to: &str, details: &ReminderDetails<'_>) -> Message {
    let time = time_text(details.start, details.end);
    Message {
        to: to.to_string(),
        subject: format!("Reminder: Reservation Tomorrow - {}", details.date),
        body: format!(
            "Hello {},\n\n\
             This is a reminder that you have a reservation scheduled for TOMORROW:\n\n\
             Date: {}\n\
             Time:{}\n\
             Professional: {}\n\
             Title: {}\n\n\
             Please make sure to attend on time.\n",
            details.recipient_name,
            details.date,
            if time.is_empty() { " N/A".to_string() } else { time },
            details.professional_name,
            details.title.unwrap_or("N/A"),
        ),
    }
}

// =============================================================================
//  PAGAMENTOS
// =============================================================================

pub struct PaymentContext<'a> {
    pub user_name: &'a str,
    pub pack_title: &'a str,
    pub pack_hours: i32,
    pub order_id: &'a str,
    pub amount: Decimal,
}

fn euros(amount: Decimal) -> String {
    format!("€{:.2}", amount.round_dp(2))
}

pub fn multibanco_instructions(
    to: &str,
    ctx: &PaymentContext<'_>,
    entity: &str,
    reference: &str,
    expiry: Option<NaiveDate>,
) -> Message {
    let expiry = expiry
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "Sem expiração".to_string());
    Message {
        to: to.to_string(),
        subject: format!("Referência de Pagamento - {}", ctx.pack_title),
        body: format!(
            "Olá {},\n\n\
             Obrigado pela sua subscrição ao plano \"{}\".\n\n\
             Entidade: {}\n\
             Referência: {}\n\
             Valor: {}\n\
             Data de Expiração: {}\n\n\
             Após a confirmação do pagamento, as suas horas serão automaticamente adicionadas à sua conta.\n\n\
             ID do Pedido: {}\n",
            ctx.user_name,
            ctx.pack_title,
            entity,
            reference,
            euros(ctx.amount),
            expiry,
            ctx.order_id,
        ),
    }
}

pub fn mbway_instructions(to: &str, ctx: &PaymentContext<'_>, phone: &str) -> Message {
    Message {
        to: to.to_string(),
        subject: format!("Pedido de Pagamento MB WAY - {}", ctx.pack_title),
        body: format!(
            "Olá {},\n\n\
             Foi enviado um pedido de pagamento MB WAY para o seu telemóvel!\n\n\
             Pack: {}\n\
             Valor: {}\n\
             Telemóvel: {}\n\
             Validade: 4 minutos\n\n\
             Após a confirmação do pagamento, as horas do pack ({} horas) serão automaticamente adicionadas à sua conta.\n\n\
             ID do Pedido: {}\n",
            ctx.user_name,
            ctx.pack_title,
            euros(ctx.amount),
            phone.replace('#', " "),
            ctx.pack_hours,
            ctx.order_id,
        ),
    }
}

pub fn creditcard_instructions(to: &str, ctx: &PaymentContext<'_>, payment_url: &str) -> Message {
    Message {
        to: to.to_string(),
        subject: format!("Pagamento por Cartão de Crédito - {}", ctx.pack_title),
        body: format!(
            "Olá {},\n\n\
             A sua página de pagamento por cartão de crédito está pronta!\n\n\
             Pack: {}\n\
             Valor: {}\n\n\
             Complete o pagamento em:\n{}\n\n\
             Após a confirmação do pagamento, as horas do pack ({} horas) serão automaticamente adicionadas à sua conta.\n\n\
             ID do Pedido: {}\n",
            ctx.user_name,
            ctx.pack_title,
            euros(ctx.amount),
            payment_url,
            ctx.pack_hours,
            ctx.order_id,
        ),
    }
}

pub fn payment_confirmed(to: &str, ctx: &PaymentContext<'_>, remaining_hours: Decimal) -> Message {
    Message {
        to: to.to_string(),
        subject: format!("Pagamento Confirmado - {}", ctx.pack_title),
        body: format!(
            "Olá {},\n\n\
             O seu pagamento foi confirmado com sucesso!\n\n\
             Plano: {}\n\
             Valor: {}\n\
             Horas adicionadas: {}\n\
             Horas disponíveis: {}\n\n\
             ID do Pedido: {}\n",
            ctx.user_name,
            ctx.pack_title,
            euros(ctx.amount),
            ctx.pack_hours,
            remaining_hours.normalize(),
            ctx.order_id,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn booking_message_includes_time_window() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10);
        let msg = booking_changed("a@b.pt", "created", date, Some(t(9, 0)), Some(t(10, 0)));

        assert_eq!(msg.subject, "Reservation Created Notification");
        assert_eq!(
            msg.body,
            "Your reservation for 2025-06-10 from 09:00 to 10:00 has been created."
        );
    }

    #[test]
    fn booking_message_without_times() {
        let msg = booking_changed("a@b.pt", "updated", None, Some(t(9, 0)), None);
        assert_eq!(msg.body, "Your reservation for N/A has been updated.");
    }

    #[test]
    fn reminder_mentions_tomorrow_and_professional() {
        let details = ReminderDetails {
            recipient_name: "Rita",
            professional_name: "Ana",
            title: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
            start: None,
            end: None,
        };
        let msg = booking_reminder("rita@x.pt", &details);

        assert_eq!(msg.subject, "Reminder: Reservation Tomorrow - 2025-06-11");
        assert!(msg.body.contains("Professional: Ana"));
        assert!(msg.body.contains("Time: N/A"));
        assert!(msg.body.contains("Title: N/A"));
    }

    #[test]
    fn payment_messages_format_amounts_with_two_decimals() {
        let ctx = PaymentContext {
            user_name: "Ana",
            pack_title: "Pack 10h",
            pack_hours: 10,
            order_id: "ORD-1",
            amount: Decimal::new(25, 0),
        };
        let msg = mbway_instructions("ana@x.pt", &ctx, "351#912345678");

        assert!(msg.body.contains("Valor: €25.00"));
        assert!(msg.body.contains("Telemóvel: 351 912345678"));
    }

    struct FailingNotifier(Mutex<u32>);

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _message: Message) -> anyhow::Result<()> {
            *self.0.lock().unwrap() += 1;
            anyhow::bail!("smtp down")
        }
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let notifier = FailingNotifier(Mutex::new(0));
        notify_quietly(&notifier, booking_changed("x@y.pt", "created", None, None, None)).await;
        assert_eq!(*notifier.0.lock().unwrap(), 1);
    }
}
